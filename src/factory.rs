//! Turning fetched payloads into records.
//!
//! The scraper never inspects payloads itself. A [`DataFactory`] decides what
//! record type a payload becomes, so a run over HTML-ish or nested data can
//! plug in its own pre-processing without touching the pipeline.

use crate::models::{Payload, ScrapedData};

/// A record whose fields a store can persist.
pub trait Record {
    fn fields(&self) -> &Payload;
}

impl Record for ScrapedData {
    fn fields(&self) -> &Payload {
        self.data()
    }
}

/// Builds one record per fetched payload.
pub trait DataFactory {
    type Record;

    fn create(&self, raw: Payload) -> Self::Record;
}

/// Wraps the payload as-is in a [`ScrapedData`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicDataFactory;

impl DataFactory for BasicDataFactory {
    type Record = ScrapedData;

    fn create(&self, raw: Payload) -> ScrapedData {
        ScrapedData::new(raw)
    }
}
