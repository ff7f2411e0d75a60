//! # Scraps
//!
//! Command-line runner: walks a date range in fixed windows, fetches each
//! window directly or through rotating proxies, and appends the results to CSV.
//!
//! ## Usage
//!
//! ```sh
//! scraps --url https://example.com/api --start 2023-01-01 --interval 7d --tor
//! ```
//!
//! Set `RUST_LOG=debug` to see every generated window and attempt.

use clap::Parser;
use itertools::Itertools;
use scraps::config::ScrapsConfig;
use scraps::factory::BasicDataFactory;
use scraps::fetch::{DirectFetch, FetchStrategy, HttpTransport, ProxyRotatedFetch};
use scraps::formatters::{DateFormatter, iso_format, ymd_format};
use scraps::models::{ScrapeRequest, WindowKeys};
use scraps::scraper::{ScrapeReport, Scraper, ThrottleConfig};
use scraps::sources::{Direction, HistoricalGenerator, MaxRequests, RequestSource, WindowConfig};
use scraps::store::CsvStore;
use scraps::utils::{ensure_writable_dir, parse_instant, parse_interval, parse_payload};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, DateFormat};

/// Everything a run needs besides its source and fetch strategy.
struct RunSettings {
    store: CsvStore,
    throttle: ThrottleConfig,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("scraps starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match &args.config {
        Some(path) => ScrapsConfig::load(path).await?,
        None => ScrapsConfig::default(),
    };
    if !args.proxies.is_empty() {
        config.proxies = args.proxies.clone();
    }
    config.throttle.override_with(args.min_delay, args.max_delay);

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Windows ----
    let window_config = WindowConfig::new(
        parse_instant(&args.start)?,
        parse_instant(&args.end)?,
        parse_interval(&args.interval)?,
        if args.backward {
            Direction::Backward
        } else {
            Direction::Forward
        },
    )?;
    let formatter: DateFormatter = match args.format {
        DateFormat::Ymd => ymd_format,
        DateFormat::Iso => iso_format,
    };
    let template = ScrapeRequest::new(args.url.clone(), parse_payload(&args.payload)?);
    let generator = HistoricalGenerator::with_format(
        window_config,
        template,
        WindowKeys::new(args.start_key.clone(), args.end_key.clone()),
        formatter,
    );
    info!(
        start = %window_config.range_start(),
        end = %window_config.range_end(),
        interval = %window_config.interval(),
        direction = ?window_config.direction(),
        windows = window_config.expected_windows(),
        remainder = generator.has_remainder(),
        "Window generator ready"
    );

    let settings = RunSettings {
        store: CsvStore::new(&args.output_dir, args.multiple_files),
        throttle: config.throttle()?,
        seed: args.seed,
    };

    let report = match args.max_requests {
        Some(max) => with_strategy(MaxRequests::new(generator, max), &args, &config, settings).await?,
        None => with_strategy(generator, &args, &config, settings).await?,
    };

    let elapsed = start_time.elapsed();
    if report.stopped {
        warn!(?report, "Run stopped early");
    }
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        fetched = report.fetched,
        persisted = report.persisted,
        skipped = report.skipped,
        "Execution complete"
    );
    Ok(())
}

/// Pick the fetch strategy requested on the command line and run.
async fn with_strategy<S: RequestSource>(
    source: S,
    args: &Cli,
    config: &ScrapsConfig,
    settings: RunSettings,
) -> Result<ScrapeReport, Box<dyn Error>> {
    let transport = HttpTransport::with_timeout(config.timeout())?;

    if args.rotates_proxies() {
        let mut fetcher =
            ProxyRotatedFetch::new(transport, config.proxies.clone())?.with_backoff(config.backoff()?);
        if let Some(seed) = settings.seed {
            fetcher = fetcher.with_seed(seed);
        }
        info!(proxies = %config.proxies.iter().join(", "), "Fetching through rotating proxies");
        run(source, fetcher, settings).await
    } else {
        info!("Fetching directly");
        run(source, DirectFetch::new(transport), settings).await
    }
}

#[instrument(level = "info", skip_all)]
async fn run<S, F>(source: S, fetcher: F, settings: RunSettings) -> Result<ScrapeReport, Box<dyn Error>>
where
    S: RequestSource,
    F: FetchStrategy,
{
    let mut scraper = Scraper::new(
        source,
        fetcher,
        BasicDataFactory,
        settings.store,
        settings.throttle,
    );
    if let Some(seed) = settings.seed {
        scraper = scraper.with_seed(seed.wrapping_add(1));
    }

    // Ctrl-C asks the loop to stop after the fetch in flight.
    let stop = scraper.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing current request");
            stop.cancel();
        }
    });

    Ok(scraper.scrape().await?)
}
