//! Date formatters used to render window boundaries into request payloads.

use chrono::NaiveDateTime;

/// Renders a window boundary for a request payload.
pub type DateFormatter = fn(&NaiveDateTime) -> String;

/// ISO 8601 without sub-second precision, suffixed with `.000Z`.
///
/// ```
/// use chrono::NaiveDate;
/// let dt = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap().and_hms_milli_opt(13, 5, 9, 250).unwrap();
/// assert_eq!(scraps::formatters::iso_format(&dt), "2024-01-07T13:05:09.000Z");
/// ```
pub fn iso_format(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Calendar date only, `YYYY-MM-DD`.
pub fn ymd_format(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}
