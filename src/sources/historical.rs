//! Temporal window generator.
//!
//! Splits `[range_start, range_end]` into back-to-back windows of a fixed
//! `interval`, walking either forward from the start or backward from the end.
//! When the interval does not divide the range evenly, a single shorter
//! remainder window closes the range after the regular ones.
//!
//! # Phases
//!
//! 1. **Regular**: emit the cursor window while it lies fully inside the range,
//!    then shift the cursor by one interval.
//! 2. **Remainder**: entered once if a partial span is left. Emits that span and
//!    drops the cursor so nothing else is emitted.
//! 3. **Done**: [`HistoricalGenerator::working`] is false.
//!
//! A cursor bound that would step outside the representable date range is
//! `None`, which counts as having left the range in the walk direction.
//!
//! The emitted windows always partition the range: no gaps, no overlaps.

use super::RequestSource;
use crate::error::{Error, Result};
use crate::formatters::{DateFormatter, ymd_format};
use crate::models::{ScrapeRequest, WindowKeys, WindowRequest};
use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, instrument};

/// Which end of the range the generator starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Walk from `range_start` toward `range_end`.
    Forward,
    /// Walk from `range_end` toward `range_start`.
    #[default]
    Backward,
}

/// Immutable description of the range to partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
    interval: TimeDelta,
    direction: Direction,
}

impl WindowConfig {
    /// # Errors
    ///
    /// - [`Error::InvalidRange`] if `range_end < range_start`
    /// - [`Error::InvalidInterval`] if `interval` is zero or negative
    pub fn new(
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
        interval: TimeDelta,
        direction: Direction,
    ) -> Result<Self> {
        if range_end < range_start {
            return Err(Error::InvalidRange {
                start: range_start,
                end: range_end,
            });
        }
        if interval <= TimeDelta::zero() {
            return Err(Error::InvalidInterval(interval));
        }
        Ok(Self {
            range_start,
            range_end,
            interval,
            direction,
        })
    }

    pub fn range_start(&self) -> NaiveDateTime {
        self.range_start
    }

    pub fn range_end(&self) -> NaiveDateTime {
        self.range_end
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Total span covered by the range.
    pub fn span(&self) -> TimeDelta {
        self.range_end - self.range_start
    }

    /// Number of windows a full run emits: `floor(S / I) + (S mod I > 0)`.
    pub fn expected_windows(&self) -> usize {
        let span = nanos(self.span());
        let interval = nanos(self.interval);
        let regular = span / interval;
        let remainder = if span % interval > 0 { 1 } else { 0 };
        (regular + remainder) as usize
    }
}

/// Emits one [`WindowRequest`] per window of a [`WindowConfig`].
#[derive(Debug, Clone)]
pub struct HistoricalGenerator {
    config: WindowConfig,
    template: ScrapeRequest,
    keys: WindowKeys,
    formatter: DateFormatter,
    cursor_start: Option<NaiveDateTime>,
    cursor_end: Option<NaiveDateTime>,
    emitted: usize,
}

impl HistoricalGenerator {
    /// Generator with the default `from`/`to` keys and `YYYY-MM-DD` dates.
    pub fn new(config: WindowConfig, template: ScrapeRequest) -> Self {
        Self::with_format(config, template, WindowKeys::default(), ymd_format)
    }

    pub fn with_format(
        config: WindowConfig,
        template: ScrapeRequest,
        keys: WindowKeys,
        formatter: DateFormatter,
    ) -> Self {
        let (cursor_start, cursor_end) = match config.direction {
            Direction::Forward => (
                Some(config.range_start),
                config.range_start.checked_add_signed(config.interval),
            ),
            Direction::Backward => (
                config.range_end.checked_sub_signed(config.interval),
                Some(config.range_end),
            ),
        };
        Self {
            config,
            template,
            keys,
            formatter,
            cursor_start,
            cursor_end,
            emitted: 0,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Whether the span not yet consumed leaves a partial window behind.
    ///
    /// Reflects the current cursor, so it flips to `false` once the
    /// remainder window has been emitted.
    pub fn has_remainder(&self) -> bool {
        self.remainder_bounds().is_some()
    }

    /// The cursor window, if it still lies fully inside the range.
    fn regular_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (start, end) = (self.cursor_start?, self.cursor_end?);
        let inside = match self.config.direction {
            Direction::Forward => end <= self.config.range_end,
            Direction::Backward => start >= self.config.range_start,
        };
        inside.then_some((start, end))
    }

    /// The partial window left once no regular window fits, if any.
    fn remainder_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let bounds = match self.config.direction {
            Direction::Forward => (self.cursor_start?, self.config.range_end),
            Direction::Backward => (self.config.range_start, self.cursor_end?),
        };
        let remaining = nanos(bounds.1 - bounds.0);
        (remaining > 0 && remaining % nanos(self.config.interval) > 0).then_some(bounds)
    }

    fn advance(&mut self) {
        let (interval, direction) = (self.config.interval, self.config.direction);
        let step = |at: Option<NaiveDateTime>| {
            at.and_then(|at| match direction {
                Direction::Forward => at.checked_add_signed(interval),
                Direction::Backward => at.checked_sub_signed(interval),
            })
        };
        (self.cursor_start, self.cursor_end) = (step(self.cursor_start), step(self.cursor_end));
    }

    fn window(&self, start: NaiveDateTime, end: NaiveDateTime) -> WindowRequest {
        WindowRequest::bounded(&self.template, start, end, &self.keys, self.formatter)
    }
}

impl RequestSource for HistoricalGenerator {
    type Request = WindowRequest;

    fn working(&self) -> bool {
        self.regular_bounds().is_some() || self.has_remainder()
    }

    #[instrument(level = "debug", skip_all, fields(emitted = self.emitted))]
    fn next(&mut self) -> Option<WindowRequest> {
        let window = if let Some((start, end)) = self.regular_bounds() {
            self.advance();
            self.window(start, end)
        } else if let Some((start, end)) = self.remainder_bounds() {
            debug!("Emitting remainder window");
            // Nothing is left on either side of the cursor.
            (self.cursor_start, self.cursor_end) = (None, None);
            self.window(start, end)
        } else {
            return None;
        };
        self.emitted += 1;
        debug!(start = %window.window_start(), end = %window.window_end(), "Generated window");
        Some(window)
    }

    fn total_requests(&self) -> usize {
        self.emitted
    }
}

fn nanos(delta: TimeDelta) -> i128 {
    delta.num_seconds() as i128 * 1_000_000_000 + delta.subsec_nanos() as i128
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Payload;
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn template() -> ScrapeRequest {
        let mut payload = Payload::new();
        payload.insert("param".into(), json!("value"));
        ScrapeRequest::new("https://example.com/api", payload)
    }

    fn generator(
        start: NaiveDateTime,
        end: NaiveDateTime,
        interval: TimeDelta,
        direction: Direction,
    ) -> HistoricalGenerator {
        let config = WindowConfig::new(start, end, interval, direction).unwrap();
        HistoricalGenerator::new(config, template())
    }

    fn drain(generator: &mut HistoricalGenerator) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        let mut windows = Vec::new();
        while generator.working() {
            let window = generator.next().expect("working generator must emit");
            windows.push((window.window_start(), window.window_end()));
        }
        windows
    }

    #[test]
    fn test_forward_exact_division_has_no_remainder() {
        let mut g = generator(day(1), day(7), TimeDelta::days(1), Direction::Forward);
        assert!(!g.has_remainder());

        let windows = drain(&mut g);
        assert_eq!(windows.len(), 6);
        assert_eq!(windows.first(), Some(&(day(1), day(2))));
        assert_eq!(windows.last(), Some(&(day(6), day(7))));
        assert_eq!(g.total_requests(), 6);
    }

    #[test]
    fn test_backward_exact_division() {
        let mut g = generator(day(1), day(7), TimeDelta::days(1), Direction::Backward);
        let windows = drain(&mut g);
        assert_eq!(windows.len(), 6);
        assert_eq!(windows.first(), Some(&(day(6), day(7))));
        assert_eq!(windows.last(), Some(&(day(1), day(2))));
    }

    #[test]
    fn test_forward_with_one_hour_remainder() {
        let end = day(7) + TimeDelta::hours(1);
        let mut g = generator(day(1), end, TimeDelta::days(1), Direction::Forward);
        assert!(g.has_remainder());

        let windows = drain(&mut g);
        assert_eq!(windows.len(), 7);
        assert_eq!(windows[5], (day(6), day(7)));
        assert_eq!(windows[6], (day(7), end));
        assert_eq!(windows[6].1 - windows[6].0, TimeDelta::hours(1));
        assert!(!g.has_remainder());
    }

    #[test]
    fn test_backward_with_one_hour_remainder() {
        let end = day(7) + TimeDelta::hours(1);
        let mut g = generator(day(1), end, TimeDelta::days(1), Direction::Backward);
        assert!(g.has_remainder());

        let windows = drain(&mut g);
        assert_eq!(windows.len(), 7);
        assert_eq!(windows[0], (day(6) + TimeDelta::hours(1), end));
        assert_eq!(windows[6], (day(1), day(1) + TimeDelta::hours(1)));
    }

    #[test]
    fn test_hourly_interval_over_six_days() {
        let mut g = generator(day(1), day(7), TimeDelta::hours(1), Direction::Backward);
        assert_eq!(drain(&mut g).len(), 6 * 24);
    }

    #[test]
    fn test_interval_longer_than_span_emits_single_window() {
        let end = day(1) + TimeDelta::hours(5);
        for direction in [Direction::Forward, Direction::Backward] {
            let mut g = generator(day(1), end, TimeDelta::days(1), direction);
            assert!(g.has_remainder());
            assert_eq!(drain(&mut g), vec![(day(1), end)]);
        }
    }

    #[test]
    fn test_empty_range_emits_nothing() {
        let mut g = generator(day(7), day(7), TimeDelta::days(1), Direction::Forward);
        assert!(!g.has_remainder());
        assert!(!g.working());
        assert!(g.next().is_none());
        assert_eq!(g.total_requests(), 0);
    }

    #[test]
    fn test_remainder_flips_after_single_request() {
        for direction in [Direction::Forward, Direction::Backward] {
            let mut g = generator(day(7), day(7) + TimeDelta::hours(1), TimeDelta::days(1), direction);
            assert!(g.has_remainder());
            g.next().unwrap();
            assert!(!g.has_remainder());
            assert!(!g.working());
        }
    }

    #[test]
    fn test_remainder_pending_after_regular_windows() {
        let end = day(3) + TimeDelta::hours(2);
        let mut g = generator(day(1), end, TimeDelta::days(1), Direction::Forward);
        g.next().unwrap();
        g.next().unwrap();
        assert!(g.has_remainder());
        assert!(g.working());
        let last = g.next().unwrap();
        assert_eq!((last.window_start(), last.window_end()), (day(3), end));
        assert!(!g.has_remainder());
    }

    #[test]
    fn test_next_after_exhaustion_is_noop() {
        let mut g = generator(day(1), day(3), TimeDelta::days(1), Direction::Forward);
        drain(&mut g);
        assert_eq!(g.total_requests(), 2);
        for _ in 0..3 {
            assert!(g.next().is_none());
        }
        assert_eq!(g.total_requests(), 2);
        assert!(!g.working());
    }

    #[test]
    fn test_walk_stops_at_edges_of_representable_dates() {
        let forward = generator(
            NaiveDateTime::MAX - TimeDelta::days(2),
            NaiveDateTime::MAX,
            TimeDelta::days(1),
            Direction::Forward,
        );
        let backward = generator(
            NaiveDateTime::MIN,
            NaiveDateTime::MIN + TimeDelta::days(2),
            TimeDelta::days(1),
            Direction::Backward,
        );

        for mut g in [forward, backward] {
            let windows: Vec<_> = std::iter::from_fn(|| g.next()).take(10).collect();
            assert_eq!(windows.len(), 2);
            assert_eq!(g.total_requests(), g.config().expected_windows());
            assert!(!g.working());
            assert!(g.next().is_none());
        }
    }

    #[test]
    fn test_remainder_window_next_to_max_date() {
        let start = NaiveDateTime::MAX - TimeDelta::days(1) - TimeDelta::hours(5);
        let mut g = generator(start, NaiveDateTime::MAX, TimeDelta::days(1), Direction::Forward);
        assert_eq!(
            drain(&mut g),
            vec![
                (start, start + TimeDelta::days(1)),
                (start + TimeDelta::days(1), NaiveDateTime::MAX),
            ]
        );
        assert!(!g.has_remainder());
    }

    #[test]
    fn test_windows_partition_range_without_gaps() {
        let start = day(1);
        let cases = [
            (day(9), TimeDelta::days(2), Direction::Forward),
            (day(9) + TimeDelta::minutes(7), TimeDelta::hours(5), Direction::Forward),
            (day(9) + TimeDelta::minutes(7), TimeDelta::hours(5), Direction::Backward),
            (day(20), TimeDelta::days(7), Direction::Backward),
            (day(2), TimeDelta::seconds(1), Direction::Forward),
        ];

        for (end, interval, direction) in cases {
            let config = WindowConfig::new(start, end, interval, direction).unwrap();
            let mut g = HistoricalGenerator::new(config, template());
            let mut windows = drain(&mut g);
            assert_eq!(windows.len(), config.expected_windows());

            windows.sort();
            assert_eq!(windows.first().unwrap().0, start);
            assert_eq!(windows.last().unwrap().1, end);
            for pair in windows.windows(2) {
                assert_eq!(pair[0].1, pair[1].0, "gap or overlap at {:?}", pair);
            }
        }
    }

    #[test]
    fn test_forward_and_backward_mirror_each_other() {
        let forward = drain(&mut generator(day(1), day(29), TimeDelta::days(7), Direction::Forward));
        let mut backward =
            drain(&mut generator(day(1), day(29), TimeDelta::days(7), Direction::Backward));
        backward.reverse();
        assert_eq!(forward, backward);

        let end = day(29) + TimeDelta::hours(3);
        let forward = drain(&mut generator(day(1), end, TimeDelta::days(7), Direction::Forward));
        let backward = drain(&mut generator(day(1), end, TimeDelta::days(7), Direction::Backward));
        assert_eq!(forward.len(), backward.len());
    }

    #[test]
    fn test_emitted_payload_carries_window_bounds() {
        let config = WindowConfig::new(day(1), day(3), TimeDelta::days(1), Direction::Forward).unwrap();
        let mut g = HistoricalGenerator::with_format(
            config,
            template(),
            WindowKeys::new("start", "end"),
            crate::formatters::iso_format,
        );
        let first = g.next().unwrap();
        assert_eq!(first.payload()["start"], json!("2024-01-01T00:00:00.000Z"));
        assert_eq!(first.payload()["end"], json!("2024-01-02T00:00:00.000Z"));
        assert_eq!(first.payload()["param"], json!("value"));
    }

    #[test]
    fn test_config_rejects_inverted_range() {
        let err = WindowConfig::new(day(7), day(1), TimeDelta::days(1), Direction::Forward).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_config_rejects_non_positive_interval() {
        for interval in [TimeDelta::zero(), TimeDelta::hours(-1)] {
            let err = WindowConfig::new(day(1), day(7), interval, Direction::Forward).unwrap_err();
            assert!(matches!(err, Error::InvalidInterval(_)));
        }
    }

    #[test]
    fn test_expected_windows_formula() {
        let config =
            WindowConfig::new(day(1), day(7) + TimeDelta::hours(1), TimeDelta::days(1), Direction::Forward)
                .unwrap();
        assert_eq!(config.expected_windows(), 7);
        let config = WindowConfig::new(day(1), day(7), TimeDelta::days(1), Direction::Forward).unwrap();
        assert_eq!(config.expected_windows(), 6);
    }
}
