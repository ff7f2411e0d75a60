//! Direct, unproxied fetching.

use super::{FetchStrategy, Transport};
use crate::models::{Payload, ScrapeRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// One plain request per call. No retries, no backoff, never stops the run.
#[derive(Debug, Clone)]
pub struct DirectFetch<T> {
    transport: T,
}

impl<T: Transport> DirectFetch<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> FetchStrategy for DirectFetch<T> {
    #[instrument(level = "info", skip_all, fields(url = %request.url()))]
    async fn fetch(&mut self, request: &ScrapeRequest, _stop: &CancellationToken) -> Option<Payload> {
        match self.transport.get(request, None, &[]).await {
            Ok(response) if response.is_success() => {
                debug!(status = response.status, "Fetched payload");
                response.body
            }
            Ok(response) => {
                warn!(status = response.status, "Unexpected response");
                None
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                None
            }
        }
    }
}
