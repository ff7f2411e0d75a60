//! Fetch strategies: turning a [`ScrapeRequest`] into a raw payload.
//!
//! A strategy is the only component that touches the network. It either
//! returns a payload or `None`, and it can end the whole run by cancelling the
//! stop token lent to it by the scraper.
//!
//! # Strategies
//!
//! | Strategy | Module | Retries | Stops run |
//! |----------|--------|---------|-----------|
//! | Direct | [`direct`] | No | Never |
//! | Proxy-rotated | [`proxy`] | Once per proxy, with fixed backoff | On HTTP 403 |
//!
//! Both go through the [`Transport`] trait, implemented for real traffic by
//! [`HttpTransport`] and by scripted fakes in tests.

pub mod direct;
pub mod headers;
pub mod proxy;
pub mod transport;

pub use direct::DirectFetch;
pub use proxy::ProxyRotatedFetch;
pub use transport::HttpTransport;

use crate::error::Result;
use crate::models::{Payload, ScrapeRequest};
use tokio_util::sync::CancellationToken;

/// Turns a request into a payload, or nothing.
pub trait FetchStrategy {
    /// Fetch `request`.
    ///
    /// `stop` belongs to the caller. Cancelling it asks the caller to end the
    /// run once this call returns; it never interrupts the current call.
    async fn fetch(&mut self, request: &ScrapeRequest, stop: &CancellationToken) -> Option<Payload>;
}

/// Status and decoded body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Only decoded for 2xx responses.
    pub body: Option<Payload>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }
}

/// A GET-style call carrying the request payload as query parameters.
///
/// Also implemented for `&T`, so a transport can be shared with a strategy and
/// still be inspected afterwards.
pub trait Transport {
    /// Issue `request`, optionally through `proxy` and with extra `headers`.
    async fn get(
        &self,
        request: &ScrapeRequest,
        proxy: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse>;
}

impl<T: Transport> Transport for &T {
    async fn get(
        &self,
        request: &ScrapeRequest,
        proxy: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        (**self).get(request, proxy, headers).await
    }
}
