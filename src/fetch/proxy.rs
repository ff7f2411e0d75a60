//! Proxy-rotated fetching with retry, backoff and a block detector.
//!
//! # Retry Strategy
//!
//! - One attempt per configured proxy, each through a different proxy
//!   (random order, no repeats within a call)
//! - A fresh randomized header set per attempt
//! - Fixed backoff (2 seconds by default) between failed attempts
//!
//! # Response Classification
//!
//! | Outcome | Action |
//! |---------|--------|
//! | 2xx | Return the payload |
//! | 403 | Cancel the stop token, return `None` immediately |
//! | Other status, transport error | Back off, try the next proxy |
//!
//! A 403 means the target has spotted the scraper. Hammering it through
//! other proxies would only burn them, so the whole run is stopped.

use super::{FetchStrategy, Transport, headers};
use crate::error::{Error, Result};
use crate::models::{Payload, ScrapeRequest};
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Local Tor SOCKS endpoint.
pub const DEFAULT_PROXY: &str = "socks5://127.0.0.1:9050";

/// Wait between two attempts of the same call.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Fetches through a rotating list of proxies.
pub struct ProxyRotatedFetch<T> {
    transport: T,
    proxies: Vec<String>,
    backoff: Duration,
    rng: StdRng,
}

impl<T: Transport> ProxyRotatedFetch<T> {
    /// # Errors
    ///
    /// Returns [`Error::NoProxies`] if `proxies` is empty.
    pub fn new(transport: T, proxies: Vec<String>) -> Result<Self> {
        if proxies.is_empty() {
            return Err(Error::NoProxies);
        }
        Ok(Self {
            transport,
            proxies,
            backoff: DEFAULT_BACKOFF,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Single proxy: the local Tor daemon.
    pub fn tor(transport: T) -> Self {
        Self {
            transport,
            proxies: vec![DEFAULT_PROXY.to_string()],
            backoff: DEFAULT_BACKOFF,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Make proxy order and headers reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }
}

impl<T> fmt::Debug for ProxyRotatedFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRotatedFetch")
            .field("proxies", &self.proxies.iter().join(", "))
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl<T: Transport> FetchStrategy for ProxyRotatedFetch<T> {
    #[instrument(level = "info", skip_all, fields(url = %request.url()))]
    async fn fetch(&mut self, request: &ScrapeRequest, stop: &CancellationToken) -> Option<Payload> {
        let total_t0 = Instant::now();
        let mut route = self.proxies.clone();
        route.shuffle(&mut self.rng);
        let max = route.len();

        for (i, proxy) in route.iter().enumerate() {
            let attempt = i + 1;
            let headers = headers::randomized(&mut self.rng);

            match self.transport.get(request, Some(proxy.as_str()), &headers).await {
                Ok(response) if response.is_success() => {
                    info!(attempt, %proxy, status = response.status, "Fetched payload");
                    return response.body;
                }
                Ok(response) if response.is_forbidden() => {
                    error!(attempt, %proxy, "Blocked by target (403); stopping run");
                    stop.cancel();
                    return None;
                }
                Ok(response) => {
                    warn!(attempt, max, %proxy, status = response.status, "Unexpected response");
                }
                Err(e) => {
                    warn!(attempt, max, %proxy, error = %e, "Attempt failed");
                }
            }

            if attempt < max {
                debug!(attempt, backoff = ?self.backoff, "Backing off before next proxy");
                sleep(self.backoff).await;
            }
        }

        warn!(
            max,
            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
            "Exhausted proxies; skipping request"
        );
        None
    }
}
