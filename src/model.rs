/// Core data types for the air-quality compliance engine.
///
/// This module defines the shared domain model imported by all other modules:
/// pollutant and standard codes, the measurement row handed over by the data
/// source, the exceedance result handed back to the dashboard, and the crate
/// error type. It contains no aggregation logic.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Concentration unit used by every pollutant in the dataset.
pub const UNIT_UG_M3: &str = "μg/m³";

// ---------------------------------------------------------------------------
// Pollutant codes
// ---------------------------------------------------------------------------

/// The five pollutants reported by the monitoring network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "SO2")]
    So2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 5] = [
        Pollutant::No2,
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::So2,
    ];

    /// Column code as it appears in the source CSV, e.g. `"PM2.5"`.
    pub fn code(&self) -> &'static str {
        match self {
            Pollutant::No2 => "NO2",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::So2 => "SO2",
        }
    }

    /// Chemical name with subscripts, for tiles and gauge labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::No2 => "NO₂",
            Pollutant::Pm25 => "PM₂.₅",
            Pollutant::Pm10 => "PM₁₀",
            Pollutant::O3 => "O₃",
            Pollutant::So2 => "SO₂",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Pollutant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Pollutant::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::UnsupportedPollutant(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Threshold standards
// ---------------------------------------------------------------------------

/// Regulatory framework used for exceedance comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Standard {
    /// UK statutory limit values.
    #[default]
    #[serde(rename = "UK")]
    Uk,
    /// WHO 2021 advisory guideline levels.
    #[serde(rename = "WHO")]
    Who,
}

impl Standard {
    pub const ALL: [Standard; 2] = [Standard::Uk, Standard::Who];

    pub fn code(&self) -> &'static str {
        match self {
            Standard::Uk => "UK",
            Standard::Who => "WHO",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Standard {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Standard::ALL
            .into_iter()
            .find(|st| st.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::UnsupportedStandard(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Measurement rows
// ---------------------------------------------------------------------------

/// A single observation for one site and pollutant.
///
/// A row with `value: None` still occupies its timestamp slot: it counts
/// towards the completeness denominator but never towards any statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub site: String,
    pub pollutant: Pollutant,
    pub value: Option<f64>,
}

impl Measurement {
    pub fn new(
        timestamp: NaiveDateTime,
        site: impl Into<String>,
        pollutant: Pollutant,
        value: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            site: site.into(),
            pollutant,
            value,
        }
    }

    /// The concentration, if the row carries a usable (finite) one.
    pub fn usable_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    /// `true` when the row carries a usable concentration.
    pub fn has_value(&self) -> bool {
        self.usable_value().is_some()
    }
}

// ---------------------------------------------------------------------------
// Exceedance result
// ---------------------------------------------------------------------------

/// What an `ExceedanceResult::value` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceedanceKind {
    /// Integer number of exceeding hours or days.
    Count,
    /// A concentration compared directly against the threshold.
    Mean,
    /// No usable data in the series.
    None,
}

/// Exceedance metric for one pollutant under one standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceedanceResult {
    pub value: f64,
    /// Annual allowance for allowance-bounded counts, otherwise the threshold.
    pub limit: f64,
    pub label: String,
    pub kind: ExceedanceKind,
}

impl ExceedanceResult {
    /// The well-defined result returned when there is nothing to measure.
    pub fn no_data() -> Self {
        Self {
            value: 0.0,
            limit: 0.0,
            label: "No data available".to_string(),
            kind: ExceedanceKind::None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.kind == ExceedanceKind::None
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the engine.
///
/// Missing or partial data is never an error; these variants cover
/// programmer mistakes and configuration problems only.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unsupported pollutant code: {0}")]
    UnsupportedPollutant(String),

    #[error("Unsupported threshold standard: {0}")]
    UnsupportedStandard(String),

    #[error("Unsupported averaging period: {0}")]
    UnsupportedPeriod(String),

    #[error("No {period} limit for {pollutant} under the {standard} standard")]
    MissingLimit {
        standard: Standard,
        pollutant: Pollutant,
        period: String,
    },

    #[error("Invalid limit table: {0}")]
    InvalidLimitTable(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid date window: {0}")]
    InvalidWindow(String),

    #[error("Failed to read {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize report: {0}")]
    Export(#[from] serde_json::Error),

    #[error("Logger initialisation failed: {0}")]
    Logging(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
