/// Date windows and series filtering.
///
/// The dashboard narrows the dataset by site selection, pollutant and an
/// inclusive date range before anything is computed. This module holds that
/// filtering step and the date-bounds calculation that keeps the date picker
/// inside the period all selected sites actually cover.
///
/// # Inclusive end day
/// `DateWindow` works in calendar dates. A window ending on 2024-03-31
/// includes every timestamp on that day, not just midnight.

use crate::model::{EngineError, Measurement, Pollutant};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Returns an error if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::InvalidWindow(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let day = timestamp.date();
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Keeps the rows for `pollutant` at the selected sites inside `window`,
/// preserving input order. An empty site selection keeps every site.
pub fn filter_series<S: AsRef<str>>(
    data: &[Measurement],
    sites: &[S],
    pollutant: Pollutant,
    window: &DateWindow,
) -> Vec<Measurement> {
    data.iter()
        .filter(|m| m.pollutant == pollutant)
        .filter(|m| site_selected(sites, &m.site))
        .filter(|m| window.contains(&m.timestamp))
        .cloned()
        .collect()
}

fn site_selected<S: AsRef<str>>(sites: &[S], site: &str) -> bool {
    sites.is_empty() || sites.iter().any(|s| s.as_ref() == site)
}

/// The date range every selected site has `pollutant` data for.
///
/// Each site's extent runs from its first to its last row carrying a value.
/// The result is the intersection of those extents, or `None` when they do
/// not overlap or a selected site has no data at all. With no sites
/// selected, the extent of the pollutant across the whole dataset is
/// returned.
pub fn allowed_window<S: AsRef<str>>(
    data: &[Measurement],
    sites: &[S],
    pollutant: Pollutant,
) -> Option<DateWindow> {
    let extent = |site: Option<&str>| -> Option<DateWindow> {
        let mut days = data
            .iter()
            .filter(|m| m.pollutant == pollutant && m.has_value())
            .filter(|m| site.is_none_or(|s| m.site == s))
            .map(|m| m.timestamp.date());
        let first = days.next()?;
        let (start, end) = days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateWindow { start, end })
    };

    if sites.is_empty() {
        return extent(None);
    }

    let mut bounds: Option<DateWindow> = None;
    for site in sites {
        let site_extent = extent(Some(site.as_ref()))?;
        bounds = Some(match bounds {
            None => site_extent,
            Some(current) => DateWindow {
                start: current.start.max(site_extent.start),
                end: current.end.min(site_extent.end),
            },
        });
    }

    bounds.filter(|w| w.start <= w.end)
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a dataset timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339 with an
/// offset (the wall-clock time in that offset is kept) and bare
/// `YYYY-MM-DD` (midnight). Rows whose timestamp fails to parse should be
/// dropped by the caller before the series reaches the engine.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, EngineError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| EngineError::InvalidTimestamp(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
