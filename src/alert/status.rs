//! Three-tier status classification for dashboard tiles and gauges.
//!
//! Two independent policies exist: exceedance counts, where higher is worse
//! and the bands are relative to the limit, and completeness percentages,
//! where higher is better and the bands are fixed.
//!
//! An unavailable value classifies as `Good`. This keeps no-data tiles from
//! raising an alarm, but it also hides a no-data state behind the same colour
//! as a clean result.

use crate::analysis::statistics::{HIGH_COMPLETENESS_PCT, MID_COMPLETENESS_PCT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Good,
    Warning,
    Danger,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "good",
            Status::Warning => "warning",
            Status::Danger => "danger",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which classification policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMode {
    /// Higher is worse: zero is good, up to half the limit is a warning.
    Exceedance,
    /// Higher is better: 85% and above is good, 75% and above a warning.
    Completeness,
}

/// Classifies `value` against `limit` under the given policy.
///
/// `limit` is only consulted in `Exceedance` mode.
pub fn classify_status(value: Option<f64>, limit: f64, mode: StatusMode) -> Status {
    let Some(value) = value else {
        return Status::Good;
    };

    match mode {
        StatusMode::Exceedance => {
            if value == 0.0 {
                Status::Good
            } else if value <= limit * 0.5 {
                Status::Warning
            } else {
                Status::Danger
            }
        }
        StatusMode::Completeness => {
            if value >= HIGH_COMPLETENESS_PCT {
                Status::Good
            } else if value >= MID_COMPLETENESS_PCT {
                Status::Warning
            } else {
                Status::Danger
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceedance_bands_against_allowance() {
        assert_eq!(classify_status(Some(0.0), 18.0, StatusMode::Exceedance), Status::Good);
        assert_eq!(classify_status(Some(9.0), 18.0, StatusMode::Exceedance), Status::Warning);
        assert_eq!(classify_status(Some(10.0), 18.0, StatusMode::Exceedance), Status::Danger);
        assert_eq!(classify_status(Some(1.0), 18.0, StatusMode::Exceedance), Status::Warning);
    }

    #[test]
    fn test_any_exceedance_against_zero_limit_is_danger() {
        assert_eq!(classify_status(Some(1.0), 0.0, StatusMode::Exceedance), Status::Danger);
    }

    #[test]
    fn test_completeness_bands() {
        assert_eq!(classify_status(Some(100.0), 100.0, StatusMode::Completeness), Status::Good);
        assert_eq!(classify_status(Some(85.0), 100.0, StatusMode::Completeness), Status::Good);
        assert_eq!(classify_status(Some(80.0), 100.0, StatusMode::Completeness), Status::Warning);
        assert_eq!(classify_status(Some(75.0), 100.0, StatusMode::Completeness), Status::Warning);
        assert_eq!(classify_status(Some(74.9), 100.0, StatusMode::Completeness), Status::Danger);
    }

    #[test]
    fn test_completeness_ignores_limit() {
        assert_eq!(classify_status(Some(90.0), 0.0, StatusMode::Completeness), Status::Good);
    }

    #[test]
    fn test_unavailable_value_is_good_in_both_modes() {
        assert_eq!(classify_status(None, 18.0, StatusMode::Exceedance), Status::Good);
        assert_eq!(classify_status(None, 100.0, StatusMode::Completeness), Status::Good);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Status::Good < Status::Warning);
        assert!(Status::Warning < Status::Danger);
        assert_eq!(Status::Danger.to_string(), "danger");
    }
}
