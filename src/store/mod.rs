//! Persistence sinks for scraped records.
//!
//! # Submodules
//!
//! - [`csv`]: writes records as CSV rows, grouped by host
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── example.com/
//!     ├── example.com_api.csv      # single-file mode
//!     ├── 0_example.com_api.csv    # multiple-files mode, first record
//!     └── 1_example.com_api.csv
//! ```

pub mod csv;

pub use self::csv::CsvStore;

use crate::error::Result;
use crate::models::ScrapeRequest;

/// Stores the record produced for `request`.
///
/// Errors are returned to the scraper, which aborts the run on the first one.
pub trait DataStore<R> {
    fn save(&mut self, record: &R, request: &ScrapeRequest) -> Result<()>;
}
