//! Crate-wide error type.

use chrono::{NaiveDateTime, TimeDelta};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid interval: {0} must be a positive duration")]
    InvalidInterval(TimeDelta),

    #[error("Invalid window: end {end} is before start {start}")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid throttle: min delay {min:?} exceeds max delay {max:?}")]
    InvalidThrottle { min: Duration, max: Duration },

    #[error("Proxy-rotated fetching needs at least one proxy")]
    NoProxies,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config Error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
