//! The scrape loop.
//!
//! [`Scraper`] pulls requests from a [`RequestSource`], fetches each through a
//! [`FetchStrategy`], turns payloads into records with a [`DataFactory`] and
//! hands them to a [`DataStore`]. After every persisted record it sleeps a
//! random delay drawn from its [`ThrottleConfig`].
//!
//! # Guarantees
//!
//! - Strictly sequential: one fetch in flight, records persisted in emission order.
//! - A window whose fetch yields nothing is skipped, never retried.
//! - A store error aborts the run.
//! - The stop token is checked at the top of each iteration only; a fetch
//!   already running always completes.

use crate::error::{Error, Result};
use crate::factory::DataFactory;
use crate::fetch::FetchStrategy;
use crate::sources::RequestSource;
use crate::store::DataStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Bounds of the random pause after each persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    min_delay: Duration,
    max_delay: Duration,
}

impl ThrottleConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidThrottle`] if `min_delay > max_delay`.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self> {
        if min_delay > max_delay {
            return Err(Error::InvalidThrottle {
                min: min_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Uniform sample from `[min_delay, max_delay]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let secs = rng.random_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Requests pulled from the source and handed to the fetch strategy.
    pub fetched: usize,
    /// Records written to the store.
    pub persisted: usize,
    /// Requests whose fetch produced no payload and were dropped.
    pub skipped: usize,
    /// Whether the fetch strategy ended the run early.
    pub stopped: bool,
}

/// Drives a source through fetch, transform and persist.
pub struct Scraper<S, F, D, St> {
    source: S,
    fetcher: F,
    factory: D,
    store: St,
    throttle: ThrottleConfig,
    rng: StdRng,
    stop: CancellationToken,
}

impl<S, F, D, St> Scraper<S, F, D, St>
where
    S: RequestSource,
    F: FetchStrategy,
    D: DataFactory,
    St: DataStore<D::Record>,
{
    pub fn new(source: S, fetcher: F, factory: D, store: St, throttle: ThrottleConfig) -> Self {
        Self {
            source,
            fetcher,
            factory,
            store,
            throttle,
            rng: StdRng::from_os_rng(),
            stop: CancellationToken::new(),
        }
    }

    /// Make throttle delays reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// A handle on the stop token, e.g. to stop the run on Ctrl-C.
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Run until the source is exhausted or the stop token is cancelled.
    ///
    /// # Errors
    ///
    /// The first error returned by the store; the run ends there.
    #[instrument(level = "info", skip_all)]
    pub async fn scrape(&mut self) -> Result<ScrapeReport> {
        let mut report = ScrapeReport::default();
        info!(
            min_delay = ?self.throttle.min_delay,
            max_delay = ?self.throttle.max_delay,
            "Begin scraping"
        );

        while self.source.working() && !self.stop.is_cancelled() {
            let Some(request) = self.source.next() else {
                break;
            };
            let request = request.as_ref();
            report.fetched += 1;
            let index = self.source.total_requests();

            match self.fetcher.fetch(request, &self.stop).await {
                Some(raw) => {
                    let record = self.factory.create(raw);
                    self.store.save(&record, request)?;
                    report.persisted += 1;

                    let delay = self.throttle.sample(&mut self.rng);
                    debug!(index, ?delay, "Persisted record; throttling");
                    sleep(delay).await;
                }
                None if self.stop.is_cancelled() => {
                    warn!(index, url = %request.url(), "Fetch strategy requested stop");
                }
                None => {
                    report.skipped += 1;
                    warn!(
                        index,
                        url = %request.url(),
                        payload = ?request.payload(),
                        "No payload; skipping request"
                    );
                }
            }
        }

        report.stopped = self.stop.is_cancelled();
        info!(
            fetched = report.fetched,
            persisted = report.persisted,
            skipped = report.skipped,
            stopped = report.stopped,
            "Done scraping"
        );
        Ok(report)
    }
}
