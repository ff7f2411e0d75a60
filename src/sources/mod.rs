//! Request sources feeding the scraper.
//!
//! A source decides *what* gets fetched next and keeps count of what it has
//! handed out. The scraper only talks to the [`RequestSource`] trait, so any
//! of the sources below (or a custom one) can drive a run:
//!
//! | Source | Module | Emits |
//! |--------|--------|-------|
//! | Temporal windows | [`historical`] | One request per window over a date range |
//! | Single request | [`single`] | Its template, exactly once |
//! | Capped | [`capped`] | Whatever the inner source emits, up to a limit |

pub mod capped;
pub mod historical;
pub mod single;

pub use capped::MaxRequests;
pub use historical::{Direction, HistoricalGenerator, WindowConfig};
pub use single::SingleRequest;

use crate::models::ScrapeRequest;

/// Something that hands out scrape requests on demand.
pub trait RequestSource {
    /// The request type emitted. It must expose the concrete request to fetch.
    type Request: AsRef<ScrapeRequest>;

    /// Whether at least one more request remains.
    fn working(&self) -> bool;

    /// The next request, or `None` once [`RequestSource::working`] is false.
    ///
    /// Calling it on an exhausted source must not change any state.
    fn next(&mut self) -> Option<Self::Request>;

    /// How many requests have been emitted so far.
    fn total_requests(&self) -> usize;
}
