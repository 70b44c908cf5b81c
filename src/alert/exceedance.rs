//! Exceedance calculation.
//!
//! Turns a filtered measurement series into the exceedance metric defined
//! for its pollutant under the selected standard (see `alert::rules`).
//! The calculation is a pure function of its inputs: the series is copied
//! into samples, put in a fixed order where the rule depends on order,
//! and reduced.

use super::rules::{Aggregation, Allowance, ExceedanceRule, rule_for};
use crate::analysis::aggregate::{
    self, Sample, chronological_samples, count_above, daily_maxima, daily_means, rolling_means,
    samples_for,
};
use crate::analysis::round_to_tenth;
use crate::limits::LimitTable;
use crate::logging::{self, EngineArea};
use crate::model::{EngineError, ExceedanceKind, ExceedanceResult, Measurement, Pollutant, Standard};

/// Computes the exceedance metric for `pollutant` under `standard`.
///
/// Rows for other pollutants are ignored. If no row for `pollutant` carries
/// a value, the result is `ExceedanceResult::no_data()`. An error is only
/// returned when `limits` lacks an entry the rule needs, which cannot happen
/// with a table that passed `LimitTable` validation.
pub fn compute_exceedance(
    series: &[Measurement],
    pollutant: Pollutant,
    standard: Standard,
    limits: &LimitTable,
) -> Result<ExceedanceResult, EngineError> {
    let samples = samples_for(series, pollutant);
    if aggregate::present_values(&samples).next().is_none() {
        logging::debug(
            EngineArea::Exceedance,
            None,
            &format!("{} / {}: no values in window ({} rows)", pollutant, standard, samples.len()),
        );
        return Ok(ExceedanceResult::no_data());
    }

    let rule = rule_for(pollutant, standard);
    let entry = limits
        .get(standard, pollutant, rule.period)
        .ok_or_else(|| missing_limit(standard, pollutant, &rule))?;
    let threshold = entry.threshold;

    let count = match rule.aggregation {
        Aggregation::WindowMean => {
            let values: Vec<f64> = aggregate::present_values(&samples).collect();
            let mean = aggregate::mean(&values).unwrap_or_default();
            return Ok(ExceedanceResult {
                value: round_to_tenth(mean),
                limit: threshold,
                label: rule.label(threshold, None),
                kind: ExceedanceKind::Mean,
            });
        }
        Aggregation::RawCount => count_above(aggregate::present_values(&samples), threshold),
        Aggregation::DailyMeanCount => count_above(daily_means(&samples).into_values(), threshold),
        Aggregation::DailyMaxCount => count_above(daily_maxima(&samples).into_values(), threshold),
        Aggregation::RollingDailyMaxCount { window } => {
            let ordered = chronological_samples(series, pollutant);
            count_rolling_exceedance_days(&ordered, window, threshold)
        }
    };

    let allowance = match rule.allowance {
        Allowance::None => None,
        Allowance::Own => entry.annual_allowed,
        Allowance::Statutory => limits
            .get(Standard::Uk, pollutant, rule.period)
            .and_then(|uk| uk.annual_allowed),
    };
    if rule.allowance != Allowance::None && allowance.is_none() {
        return Err(missing_limit(Standard::Uk, pollutant, &rule));
    }

    logging::debug(
        EngineArea::Exceedance,
        None,
        &format!("{} / {}: {} exceedances above {}", pollutant, standard, count, threshold),
    );

    Ok(ExceedanceResult {
        value: count as f64,
        limit: allowance.map_or(threshold, f64::from),
        label: rule.label(threshold, allowance),
        kind: ExceedanceKind::Count,
    })
}

/// Days on which the highest rolling mean is above `threshold`. Window
/// positions without a full window of values do not take part, so a day
/// with no complete window is never counted.
fn count_rolling_exceedance_days(sorted: &[Sample], window: usize, threshold: f64) -> usize {
    let rolled = rolling_means(sorted, window);
    count_above(daily_maxima(&rolled).into_values(), threshold)
}

fn missing_limit(standard: Standard, pollutant: Pollutant, rule: &ExceedanceRule) -> EngineError {
    EngineError::MissingLimit {
        standard,
        pollutant,
        period: rule.period.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
