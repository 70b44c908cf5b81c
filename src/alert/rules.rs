//! Per-pollutant exceedance rules.
//!
//! Each pollutant has a legally defined way of turning a concentration
//! series into a compliance metric, and the definition differs between the
//! UK statutory limits and the WHO guideline levels. This module is the
//! single place that encodes which averaging period, aggregation and
//! allowance apply to each `(pollutant, standard)` pair. The thresholds
//! themselves live in the `LimitTable`.

use crate::limits::Period;
use crate::model::{Pollutant, Standard, UNIT_UG_M3};

/// Number of consecutive samples in the ozone rolling mean.
pub const ROLLING_WINDOW_SAMPLES: usize = 8;

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// How the series is reduced before comparison with the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Mean of every value, compared directly against the threshold.
    WindowMean,
    /// Number of raw (hourly) values above the threshold.
    RawCount,
    /// Number of calendar days whose mean is above the threshold.
    DailyMeanCount,
    /// Number of calendar days whose maximum is above the threshold.
    DailyMaxCount,
    /// Rolling mean over `window` consecutive samples, then the number of
    /// calendar days whose maximum rolling mean is above the threshold.
    RollingDailyMaxCount { window: usize },
}

/// Where the annual allowance reported as `limit` comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    /// No allowance; the threshold itself is reported as the limit.
    None,
    /// The allowance stored on the rule's own limit entry.
    Own,
    /// The UK statutory allowance for the same pollutant and period.
    Statutory,
}

/// The complete exceedance definition for one pollutant under one standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceedanceRule {
    pub period: Period,
    pub aggregation: Aggregation,
    pub allowance: Allowance,
}

impl ExceedanceRule {
    /// `true` when the rule produces a count of exceeding periods.
    pub fn is_count(&self) -> bool {
        self.aggregation != Aggregation::WindowMean
    }

    /// Human-readable description of the metric, including the threshold,
    /// the unit and, when one applies, the annual allowance.
    pub fn label(&self, threshold: f64, allowance: Option<u32>) -> String {
        let base = match self.aggregation {
            Aggregation::WindowMean => {
                return format!("Annual mean (limit: {} {})", threshold, UNIT_UG_M3);
            }
            Aggregation::RawCount => format!("Hours exceeding {} {}", threshold, UNIT_UG_M3),
            Aggregation::DailyMeanCount | Aggregation::DailyMaxCount => {
                format!("Days exceeding {} {}", threshold, UNIT_UG_M3)
            }
            Aggregation::RollingDailyMaxCount { window } => {
                format!("Days exceeding {}h mean {} {}", window, threshold, UNIT_UG_M3)
            }
        };

        match allowance {
            Some(max) => format!("{} (max {}/year)", base, max),
            None => base,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Returns the exceedance rule for a pollutant under a standard.
pub fn rule_for(pollutant: Pollutant, standard: Standard) -> ExceedanceRule {
    use Aggregation::*;

    let (period, aggregation, allowance) = match (pollutant, standard) {
        (Pollutant::Pm25, Standard::Uk) => (Period::Annual, WindowMean, Allowance::None),
        (Pollutant::Pm25, Standard::Who) => (Period::Daily, DailyMeanCount, Allowance::None),

        (Pollutant::Pm10, Standard::Uk) => (Period::Daily, DailyMeanCount, Allowance::Own),
        (Pollutant::Pm10, Standard::Who) => (Period::Daily, DailyMeanCount, Allowance::Statutory),

        (Pollutant::No2, Standard::Uk) => (Period::Hourly, RawCount, Allowance::Own),
        (Pollutant::No2, Standard::Who) => (Period::Daily, DailyMaxCount, Allowance::None),

        (Pollutant::So2, Standard::Uk) => (Period::Daily, DailyMeanCount, Allowance::Own),
        (Pollutant::So2, Standard::Who) => (Period::Daily, DailyMeanCount, Allowance::None),

        (Pollutant::O3, Standard::Uk) => (
            Period::EightHour,
            RollingDailyMaxCount { window: ROLLING_WINDOW_SAMPLES },
            Allowance::Own,
        ),
        (Pollutant::O3, Standard::Who) => (
            Period::EightHour,
            RollingDailyMaxCount { window: ROLLING_WINDOW_SAMPLES },
            Allowance::Statutory,
        ),
    };

    ExceedanceRule {
        period,
        aggregation,
        allowance,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
