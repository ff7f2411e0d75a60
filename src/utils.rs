//! Parsing helpers for command-line values and output directory checks.
//!
//! - Interval strings such as `7d` or `90m`
//! - Instants given as a date, a date-time, or `now`
//! - JSON object payloads
//! - Output directory validation

use crate::error::{Error, Result};
use crate::models::Payload;
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static INTERVAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s*([smhdw])\s*$").unwrap());

/// Parse an interval such as `45s`, `30m`, `12h`, `7d` or `2w`.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// assert_eq!(scraps::utils::parse_interval("7d").unwrap(), TimeDelta::days(7));
/// assert!(scraps::utils::parse_interval("7 fortnights").is_err());
/// ```
pub fn parse_interval(text: &str) -> Result<TimeDelta> {
    let invalid = || Error::InvalidArgument(format!("invalid interval {text:?}, expected e.g. 7d"));
    let caps = INTERVAL.captures(text).ok_or_else(invalid)?;
    let amount: i64 = caps[1].parse().map_err(|_| invalid())?;
    let delta = match &caps[2] {
        "s" => TimeDelta::try_seconds(amount),
        "m" => TimeDelta::try_minutes(amount),
        "h" => TimeDelta::try_hours(amount),
        "d" => TimeDelta::try_days(amount),
        _ => TimeDelta::try_weeks(amount),
    };
    delta.ok_or_else(invalid)
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (or with a space), or `now`.
pub fn parse_instant(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("now") {
        return Ok(Local::now().naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(at);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidArgument(format!("invalid date {text:?}")))
}

/// Parse a JSON object used as the request payload template.
pub fn parse_payload(text: &str) -> Result<Payload> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidArgument(format!(
            "payload must be a JSON object, got {text}"
        ))),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
