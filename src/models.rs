//! Request and record types flowing through a scrape run.
//!
//! This module defines the values passed between the pipeline stages:
//! - [`ScrapeRequest`]: a URL plus a key/value query payload
//! - [`WindowRequest`]: a template request pinned to a concrete time window
//! - [`ScrapedData`]: the record built from a fetched payload
//!
//! All of them are immutable once built. "Changing" a request means
//! constructing a new one, so no derived field can go stale.

use crate::error::{Error, Result};
use crate::formatters::{DateFormatter, ymd_format};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object, used both for query payloads and fetched bodies.
pub type Payload = serde_json::Map<String, Value>;

/// A URL and the query payload sent along with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    url: String,
    payload: Payload,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, payload: Payload) -> Self {
        Self {
            url: url.into(),
            payload,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Same URL, different payload.
    pub fn with_payload(&self, payload: Payload) -> Self {
        Self {
            url: self.url.clone(),
            payload,
        }
    }
}

impl AsRef<ScrapeRequest> for ScrapeRequest {
    fn as_ref(&self) -> &ScrapeRequest {
        self
    }
}

/// Payload keys under which window boundaries are injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowKeys {
    pub start_key: String,
    pub end_key: String,
}

impl WindowKeys {
    pub fn new(start_key: impl Into<String>, end_key: impl Into<String>) -> Self {
        Self {
            start_key: start_key.into(),
            end_key: end_key.into(),
        }
    }
}

impl Default for WindowKeys {
    fn default() -> Self {
        Self::new("from", "to")
    }
}

/// A template request bound to `[window_start, window_end]`.
///
/// The boundaries are rendered with the supplied [`DateFormatter`] and written
/// into a copy of the template payload under the configured [`WindowKeys`].
/// The template itself is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRequest {
    request: ScrapeRequest,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
}

impl WindowRequest {
    /// Build a window request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] if `window_end < window_start`.
    pub fn new(
        template: &ScrapeRequest,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        keys: &WindowKeys,
        formatter: DateFormatter,
    ) -> Result<Self> {
        if window_end < window_start {
            return Err(Error::InvalidWindow {
                start: window_start,
                end: window_end,
            });
        }
        Ok(Self::bounded(template, window_start, window_end, keys, formatter))
    }

    /// Same as [`WindowRequest::new`] with the default keys and `ymd_format`.
    pub fn with_defaults(
        template: &ScrapeRequest,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Result<Self> {
        Self::new(
            template,
            window_start,
            window_end,
            &WindowKeys::default(),
            ymd_format,
        )
    }

    // Callers guarantee window_end >= window_start.
    pub(crate) fn bounded(
        template: &ScrapeRequest,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        keys: &WindowKeys,
        formatter: DateFormatter,
    ) -> Self {
        let mut payload = template.payload().clone();
        payload.insert(
            keys.start_key.clone(),
            Value::String(formatter(&window_start)),
        );
        payload.insert(keys.end_key.clone(), Value::String(formatter(&window_end)));

        Self {
            request: template.with_payload(payload),
            window_start,
            window_end,
        }
    }

    pub fn window_start(&self) -> NaiveDateTime {
        self.window_start
    }

    pub fn window_end(&self) -> NaiveDateTime {
        self.window_end
    }

    pub fn url(&self) -> &str {
        self.request.url()
    }

    pub fn payload(&self) -> &Payload {
        self.request.payload()
    }

    pub fn request(&self) -> &ScrapeRequest {
        &self.request
    }
}

impl AsRef<ScrapeRequest> for WindowRequest {
    fn as_ref(&self) -> &ScrapeRequest {
        &self.request
    }
}

/// A scraped record: the raw fields returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedData {
    data: Payload,
}

impl ScrapedData {
    pub fn new(data: Payload) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Payload {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }
}
