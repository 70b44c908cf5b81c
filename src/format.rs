//! Display helpers for the presentation layer.
//!
//! The engine itself only returns numbers and `Option`s. These helpers turn
//! them into the strings the dashboard tiles show, including the `--`
//! placeholder for unavailable values.

use crate::analysis::statistics::{HIGH_COMPLETENESS_PCT, MID_COMPLETENESS_PCT};
use crate::model::{ExceedanceKind, UNIT_UG_M3};
use chrono::{Datelike, NaiveDate};

/// Placeholder shown wherever a value is unavailable.
pub const PLACEHOLDER: &str = "--";

/// Formats a statistic to one decimal place, or the placeholder.
pub fn format_statistic(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Short label for the selected period, e.g. `Jan – Mar 2024` or
/// `Nov 2023 – Feb 2024`.
pub fn format_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return PLACEHOLDER.to_string();
    };

    if start.year() == end.year() {
        format!("{} – {}", start.format("%b"), end.format("%b %Y"))
    } else {
        format!("{} – {}", start.format("%b %Y"), end.format("%b %Y"))
    }
}

/// One-line verdict shown under the completeness tile.
pub fn completeness_note(pct: f64) -> &'static str {
    if pct >= HIGH_COMPLETENESS_PCT {
        "Excellent data quality"
    } else if pct >= MID_COMPLETENESS_PCT {
        "Acceptable quality"
    } else {
        "Significant gaps"
    }
}

/// Unit shown next to an exceedance value.
pub fn exceedance_unit(kind: ExceedanceKind) -> &'static str {
    match kind {
        ExceedanceKind::Count => "count",
        ExceedanceKind::Mean | ExceedanceKind::None => UNIT_UG_M3,
    }
}

/// Completeness as shown on the tile, e.g. `87.5%`.
pub fn format_percentage(pct: f64) -> String {
    format!("{:.1}%", pct)
}
