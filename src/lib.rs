//! # Scraps
//!
//! Scrape an endpoint over a historical date range, one time window at a time.
//!
//! ## Architecture
//!
//! A run is a strictly sequential pipeline:
//! 1. **Windowing**: [`sources::HistoricalGenerator`] splits the range into
//!    contiguous windows and injects each window's bounds into the payload
//! 2. **Fetching**: a [`fetch::FetchStrategy`] issues the request, either
//!    directly or through rotating proxies with retry and backoff
//! 3. **Transform**: a [`factory::DataFactory`] turns the payload into a record
//! 4. **Persist**: a [`store::DataStore`] writes the record (CSV by default)
//! 5. **Throttle**: the [`scraper::Scraper`] sleeps a random delay and repeats
//!
//! The run ends when the windows run out, when a fetch strategy cancels the
//! stop token (e.g. after an HTTP 403), or on the first persistence error.
//!
//! ## Usage
//!
//! ```no_run
//! use chrono::{NaiveDate, TimeDelta};
//! use scraps::factory::BasicDataFactory;
//! use scraps::fetch::{HttpTransport, ProxyRotatedFetch};
//! use scraps::models::{Payload, ScrapeRequest};
//! use scraps::scraper::{Scraper, ThrottleConfig};
//! use scraps::sources::{Direction, HistoricalGenerator, WindowConfig};
//! use scraps::store::CsvStore;
//! use std::time::Duration;
//!
//! # async fn run() -> scraps::Result<()> {
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let config = WindowConfig::new(start, end, TimeDelta::days(7), Direction::Backward)?;
//! let source = HistoricalGenerator::new(config, ScrapeRequest::new("https://example.com/api", Payload::new()));
//!
//! let mut scraper = Scraper::new(
//!     source,
//!     ProxyRotatedFetch::tor(HttpTransport::new()?),
//!     BasicDataFactory,
//!     CsvStore::new("./out", false),
//!     ThrottleConfig::new(Duration::from_secs(20), Duration::from_secs(40))?,
//! );
//! let report = scraper.scrape().await?;
//! println!("saved {} records", report.persisted);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod fetch;
pub mod formatters;
pub mod models;
pub mod scraper;
pub mod sources;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
