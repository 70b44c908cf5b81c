//! Calendar-day grouping and rolling-window reduction.
//!
//! All functions here operate on `Sample`s, the `(timestamp, value)` pairs
//! extracted from a measurement series for a single pollutant. Samples with
//! no value keep their slot in the sequence, which matters for the rolling
//! window, but never contribute to a mean or maximum.
//!
//! Calendar days are the date component of the timestamp as given. No time
//! zone conversion happens here.

use crate::model::{Measurement, Pollutant};
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One slot of a single-pollutant series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl Sample {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl From<&Measurement> for Sample {
    fn from(m: &Measurement) -> Self {
        Sample {
            timestamp: m.timestamp,
            value: m.usable_value(),
        }
    }
}

/// Extracts the samples for `pollutant` from a mixed series, preserving order.
pub fn samples_for(series: &[Measurement], pollutant: Pollutant) -> Vec<Sample> {
    series
        .iter()
        .filter(|m| m.pollutant == pollutant)
        .map(Sample::from)
        .collect()
}

/// Extracts the samples for `pollutant` in a fixed order that does not
/// depend on the order of `series`.
///
/// Rows are ordered by timestamp, then site, then value (missing first).
/// Sites in one selection usually share timestamps, so the site is needed
/// to break those ties.
pub fn chronological_samples(series: &[Measurement], pollutant: Pollutant) -> Vec<Sample> {
    let mut rows: Vec<&Measurement> = series.iter().filter(|m| m.pollutant == pollutant).collect();
    rows.sort_by(|a, b| chronological_order(a, b));
    rows.into_iter().map(Sample::from).collect()
}

fn chronological_order(a: &Measurement, b: &Measurement) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.site.cmp(&b.site))
        .then_with(|| match (a.usable_value(), b.usable_value()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        })
}

/// Iterates over the values that are present.
pub fn present_values(samples: &[Sample]) -> impl Iterator<Item = f64> + '_ {
    samples.iter().filter_map(|s| s.value)
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn group_by_day(samples: &[Sample]) -> BTreeMap<NaiveDate, Vec<f64>> {
    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        if let Some(value) = sample.value {
            days.entry(sample.date()).or_default().push(value);
        }
    }
    days
}

/// Mean value per calendar day. Days with no values are absent.
pub fn daily_means(samples: &[Sample]) -> BTreeMap<NaiveDate, f64> {
    group_by_day(samples)
        .into_iter()
        .filter_map(|(day, values)| mean(&values).map(|m| (day, m)))
        .collect()
}

/// Maximum value per calendar day. Days with no values are absent.
pub fn daily_maxima(samples: &[Sample]) -> BTreeMap<NaiveDate, f64> {
    group_by_day(samples)
        .into_iter()
        .filter_map(|(day, values)| values.into_iter().reduce(f64::max).map(|m| (day, m)))
        .collect()
}

/// Rolling mean over `window` consecutive samples of the sequence as given.
///
/// The output has one sample per input sample, stamped with the timestamp of
/// the last sample in its window. A window position yields a value only when
/// all `window` samples in it carry a value; the first `window - 1`
/// positions never do. The window counts samples, not hours, so gaps in the
/// timestamps are not bridged or padded.
pub fn rolling_means(samples: &[Sample], window: usize) -> Vec<Sample> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let value = if window == 0 || i + 1 < window {
                None
            } else {
                let slots = &samples[i + 1 - window..=i];
                slots
                    .iter()
                    .map(|s| s.value)
                    .sum::<Option<f64>>()
                    .map(|sum| sum / window as f64)
            };
            Sample {
                timestamp: sample.timestamp,
                value,
            }
        })
        .collect()
}

/// Number of values strictly above `threshold`.
pub fn count_above<I>(values: I, threshold: f64) -> usize
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().filter(|&v| v > threshold).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
