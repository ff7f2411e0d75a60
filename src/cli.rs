//! Command-line interface definitions for scraps.
//!
//! All arguments can be provided via command-line flags; the ones that tend to
//! differ per machine (output directory, config file, proxies) also read
//! environment variables.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How window boundaries are rendered into the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    Ymd,
    /// `YYYY-MM-DDTHH:MM:SS.000Z`
    Iso,
}

/// Command-line arguments for a windowed scrape run.
///
/// # Examples
///
/// ```sh
/// # Weekly windows from 2023 until now, walking backward, straight HTTP
/// scraps --url https://example.com/api --start 2023-01-01 --interval 7d --backward
///
/// # Through Tor, hourly windows, one CSV per window
/// scraps --url https://example.com/api --start 2024-01-01 --end 2024-01-07 \
///        --interval 1h --tor --multiple-files
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Endpoint to scrape
    #[arg(short, long)]
    pub url: String,

    /// JSON object sent as query parameters with every request
    #[arg(short, long, default_value = "{}")]
    pub payload: String,

    /// First instant of the range (YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS or "now")
    #[arg(short, long)]
    pub start: String,

    /// Last instant of the range
    #[arg(short, long, default_value = "now")]
    pub end: String,

    /// Window length, e.g. 45s, 30m, 12h, 7d, 2w
    #[arg(short, long, default_value = "7d")]
    pub interval: String,

    /// Payload key receiving the window start
    #[arg(long, default_value = "from")]
    pub start_key: String,

    /// Payload key receiving the window end
    #[arg(long, default_value = "to")]
    pub end_key: String,

    /// Date format for window boundaries
    #[arg(long, value_enum, default_value_t = DateFormat::Ymd)]
    pub format: DateFormat,

    /// Walk from the end of the range back to its start
    #[arg(short, long)]
    pub backward: bool,

    /// Stop after this many requests
    #[arg(long)]
    pub max_requests: Option<usize>,

    /// Fetch through rotating proxies (Tor by default)
    #[arg(long)]
    pub tor: bool,

    /// Proxy URL to rotate through (repeatable); overrides the config file
    /// and implies --tor
    #[arg(long = "proxy", env = "SCRAPS_PROXIES", value_delimiter = ',')]
    pub proxies: Vec<String>,

    /// Minimum pause in seconds after each saved record (raises the maximum
    /// if needed)
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Maximum pause in seconds after each saved record (lowers the minimum
    /// if needed)
    #[arg(long)]
    pub max_delay: Option<f64>,

    /// Directory receiving the CSV output
    #[arg(short, long, env = "SCRAPS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Write one CSV file per record instead of one per URL
    #[arg(long)]
    pub multiple_files: bool,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "SCRAPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for proxy order, headers and throttle delays
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Whether to fetch through rotating proxies rather than directly.
    pub fn rotates_proxies(&self) -> bool {
        self.tor || !self.proxies.is_empty()
    }
}
