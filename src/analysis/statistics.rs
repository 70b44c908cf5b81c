//! Completeness ratios and descriptive statistics.
//!
//! Completeness is the share of rows in the filtered window that carry a
//! value. The denominator is the number of rows actually present, not the
//! number of samples the calendar would lead one to expect, so a sensor
//! outage that produced no rows at all does not lower the ratio.

use super::round_to_tenth;
use crate::logging::{self, EngineArea};
use crate::model::Measurement;
use serde::{Deserialize, Serialize};

/// Completeness at or above this percentage is rated high.
pub const HIGH_COMPLETENESS_PCT: f64 = 85.0;

/// Completeness at or above this percentage (and below high) is rated mid.
pub const MID_COMPLETENESS_PCT: f64 = 75.0;

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

/// Coarse rating of a completeness percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletenessTier {
    High,
    Mid,
    Low,
}

impl CompletenessTier {
    pub fn from_pct(pct: f64) -> Self {
        if pct >= HIGH_COMPLETENESS_PCT {
            CompletenessTier::High
        } else if pct >= MID_COMPLETENESS_PCT {
            CompletenessTier::Mid
        } else {
            CompletenessTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletenessTier::High => "high",
            CompletenessTier::Mid => "mid",
            CompletenessTier::Low => "low",
        }
    }
}

/// Completeness for a single monitoring site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteCompleteness {
    pub site: String,
    pub completeness_pct: f64,
    pub tier: CompletenessTier,
}

/// Overall completeness plus the per-site breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall_pct: f64,
    pub overall_tier: CompletenessTier,
    pub sites: Vec<SiteCompleteness>,
}

/// Percentage of rows carrying a value, rounded to one decimal.
/// Returns `0.0` for an empty window.
pub fn compute_completeness(series: &[Measurement]) -> f64 {
    completeness_of(series.iter())
}

fn completeness_of<'a, I>(rows: I) -> f64
where
    I: Iterator<Item = &'a Measurement>,
{
    let (total, valid) = rows.fold((0usize, 0usize), |(total, valid), m| {
        (total + 1, valid + usize::from(m.has_value()))
    });
    if total == 0 {
        return 0.0;
    }
    round_to_tenth(valid as f64 / total as f64 * 100.0)
}

/// Completeness for each requested site, in the order requested.
///
/// Sites with no rows in the window are left out rather than reported as
/// 0%: the engine does not invent entries for sites it has not seen.
pub fn compute_completeness_by_site<S: AsRef<str>>(
    series: &[Measurement],
    sites: &[S],
) -> Vec<SiteCompleteness> {
    sites
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|site| {
            let mut rows = series.iter().filter(|m| m.site == site).peekable();
            if rows.peek().is_none() {
                logging::debug(EngineArea::Completeness, Some(site), "No rows in window, omitted");
                return None;
            }
            let pct = completeness_of(rows);
            Some(SiteCompleteness {
                site: site.to_string(),
                completeness_pct: pct,
                tier: CompletenessTier::from_pct(pct),
            })
        })
        .collect()
}

/// Overall and per-site completeness in one pass over the request.
pub fn completeness_report<S: AsRef<str>>(
    series: &[Measurement],
    sites: &[S],
) -> CompletenessReport {
    let overall_pct = compute_completeness(series);
    CompletenessReport {
        overall_pct,
        overall_tier: CompletenessTier::from_pct(overall_pct),
        sites: compute_completeness_by_site(series, sites),
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics over the values present in a series.
///
/// Every field is rounded to one decimal. `None` marks a statistic that is
/// unavailable, which is the case for all fields when the series has no
/// values, and for `std` when it has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub iqr: Option<f64>,
}

impl SummaryStats {
    pub fn unavailable() -> Self {
        Self {
            mean: None,
            median: None,
            std: None,
            min: None,
            max: None,
            iqr: None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.mean.is_none()
    }
}

/// Summary statistics over the non-missing values of a series.
pub fn compute_summary_stats(series: &[Measurement]) -> SummaryStats {
    let mut values: Vec<f64> = series.iter().filter_map(Measurement::usable_value).collect();
    if values.is_empty() {
        logging::debug(EngineArea::Statistics, None, "No values in window, statistics unavailable");
        return SummaryStats::unavailable();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((sum_sq / (n - 1.0)).sqrt())
    } else {
        None
    };

    values.sort_by(f64::total_cmp);
    let iqr = quantile(&values, 0.75).zip(quantile(&values, 0.25)).map(|(q3, q1)| q3 - q1);

    SummaryStats {
        mean: Some(round_to_tenth(mean)),
        median: quantile(&values, 0.5).map(round_to_tenth),
        std: std.map(round_to_tenth),
        min: values.first().copied().map(round_to_tenth),
        max: values.last().copied().map(round_to_tenth),
        iqr: iqr.map(round_to_tenth),
    }
}

/// Linear-interpolation quantile of an ascending slice, `None` when empty.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
