//! CSV persistence.
//!
//! Records are written under `<root>/<host>/`, where `<host>` comes from the
//! request URL. Two layouts are supported:
//!
//! - **Single file** (default): every record for a URL is appended to
//!   `<slug>.csv`.
//! - **Multiple files**: each record gets its own `<n>_<slug>.csv`, `n` being
//!   the number of records already saved for that URL by this store.
//!
//! The header row is written only when the target file is empty, so reruns
//! keep appending to the same table.

use super::DataStore;
use crate::error::{Error, Result};
use crate::factory::Record;
use crate::models::ScrapeRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());
static UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

/// Writes records as CSV files grouped by host.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    multiple_files: bool,
    saved: HashMap<String, usize>,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>, multiple_files: bool) -> Self {
        Self {
            root: root.into(),
            multiple_files,
            saved: HashMap::new(),
        }
    }

    /// How many records this store has saved for `url`.
    pub fn saved_for(&self, url: &str) -> usize {
        self.saved.get(url).copied().unwrap_or(0)
    }

    fn folder(&self, url: &str) -> Result<PathBuf> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::InvalidArgument(format!("cannot store records for {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::InvalidArgument(format!("{url} has no host")))?;
        let folder = self.root.join(host);
        fs::create_dir_all(&folder)?;
        Ok(folder)
    }

    fn filename(&self, url: &str) -> String {
        if self.multiple_files {
            format!("{}_{}.csv", self.saved_for(url), url_slug(url))
        } else {
            format!("{}.csv", url_slug(url))
        }
    }
}

/// `https://example.com/a/b` -> `example.com_a_b`
pub fn url_slug(url: &str) -> String {
    let bare = SCHEME.replace(url, "");
    UNSAFE.replace_all(&bare, "_").into_owned()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn append_row<R: Record>(path: &Path, record: &R) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    let fields = record.fields();
    if is_empty {
        writer.write_record(fields.keys())?;
    }
    writer.write_record(fields.values().map(cell))?;
    writer.flush()?;
    Ok(())
}

impl<R: Record> DataStore<R> for CsvStore {
    #[instrument(level = "debug", skip_all, fields(url = %request.url()))]
    fn save(&mut self, record: &R, request: &ScrapeRequest) -> Result<()> {
        let url = request.url();
        let path = self.folder(url)?.join(self.filename(url));

        append_row(&path, record)?;
        *self.saved.entry(url.to_string()).or_insert(0) += 1;

        debug!(fields = record.fields().len(), "Appended CSV row");
        info!(path = %path.display(), "Saved record");
        Ok(())
    }
}
