/// Regulatory limit table for the air-quality compliance engine.
///
/// Maps `standard → pollutant → averaging period` to a concentration
/// threshold and, for UK statutory limits, the number of exceedances
/// permitted per year. This is the single source of truth for threshold
/// values; the exceedance rules in `alert::rules` decide which entry applies.
///
/// The table is immutable once constructed. The built-in table is built
/// lazily on first use and shared process-wide; alternative tables can be
/// loaded from TOML and are validated before they are handed out.
///
/// WHO coverage is partial. A missing entry means "no WHO guideline for this
/// averaging period" and lookups return `None`, never a zero threshold.

use crate::alert::rules::{Allowance, rule_for};
use crate::logging::{self, EngineArea};
use crate::model::{EngineError, Pollutant, Standard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Averaging periods
// ---------------------------------------------------------------------------

/// Averaging period a limit value is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "8h")]
    EightHour,
    #[serde(rename = "annual")]
    Annual,
}

impl Period {
    pub fn code(&self) -> &'static str {
        match self {
            Period::Hourly => "hourly",
            Period::Daily => "daily",
            Period::EightHour => "8h",
            Period::Annual => "annual",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Period::Hourly),
            "daily" => Ok(Period::Daily),
            "8h" => Ok(Period::EightHour),
            "annual" => Ok(Period::Annual),
            _ => Err(EngineError::UnsupportedPeriod(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Table entries
// ---------------------------------------------------------------------------

/// One limit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitEntry {
    pub period: Period,
    /// Concentration threshold in μg/m³.
    pub threshold: f64,
    /// Exceedances permitted per calendar year, where the law defines one.
    pub annual_allowed: Option<u32>,
}

/// Flat row form of a table entry, as stored in `[[limit]]` TOML tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitRecord {
    pub standard: Standard,
    pub pollutant: Pollutant,
    pub period: Period,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_allowed: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
struct LimitFile {
    #[serde(rename = "limit", default)]
    limits: Vec<LimitRecord>,
}

// ---------------------------------------------------------------------------
// Limit table
// ---------------------------------------------------------------------------

/// Immutable `standard → pollutant → period` threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitTable {
    entries: BTreeMap<(Standard, Pollutant), Vec<LimitEntry>>,
}

static BUILTIN: LazyLock<LimitTable> = LazyLock::new(|| LimitTable {
    entries: index_records(builtin_records()),
});

impl LimitTable {
    /// The statutory UK and WHO guideline table shipped with the engine.
    pub fn builtin() -> &'static LimitTable {
        &BUILTIN
    }

    /// Builds a table from flat records, rejecting anything that would make
    /// an exceedance rule unanswerable.
    pub fn from_records(records: Vec<LimitRecord>) -> Result<Self, EngineError> {
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            if !record.threshold.is_finite() || record.threshold <= 0.0 {
                return Err(EngineError::InvalidLimitTable(format!(
                    "{} {} {} threshold must be a positive number, got {}",
                    record.standard, record.pollutant, record.period, record.threshold
                )));
            }
            if !seen.insert((record.standard, record.pollutant, record.period)) {
                return Err(EngineError::InvalidLimitTable(format!(
                    "duplicate {} {} {} entry",
                    record.standard, record.pollutant, record.period
                )));
            }
        }

        let table = LimitTable {
            entries: index_records(records),
        };
        table.validate()?;
        Ok(table)
    }

    /// Parses a `[[limit]]` TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let file: LimitFile = toml::from_str(contents)?;
        Self::from_records(file.limits)
    }

    /// Loads a limit table from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_toml_str(&contents)?;
        logging::info(
            EngineArea::Limits,
            None,
            &format!("Loaded {} limit entries from {}", table.len(), path.display()),
        );
        Ok(table)
    }

    /// Serializes the table back to the `[[limit]]` TOML layout.
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        let file = LimitFile {
            limits: self.records(),
        };
        toml::to_string(&file).map_err(|e| EngineError::InvalidLimitTable(e.to_string()))
    }

    /// All entries for a pollutant under a standard, in period order.
    pub fn entries(&self, standard: Standard, pollutant: Pollutant) -> &[LimitEntry] {
        self.entries
            .get(&(standard, pollutant))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a single entry. `None` means the standard gives no limit
    /// for this averaging period.
    pub fn get(
        &self,
        standard: Standard,
        pollutant: Pollutant,
        period: Period,
    ) -> Option<&LimitEntry> {
        self.entries(standard, pollutant)
            .iter()
            .find(|entry| entry.period == period)
    }

    /// Shorthand for the threshold of a single entry.
    pub fn threshold(
        &self,
        standard: Standard,
        pollutant: Pollutant,
        period: Period,
    ) -> Option<f64> {
        self.get(standard, pollutant, period).map(|entry| entry.threshold)
    }

    /// Pollutants the standard defines at least one limit for.
    pub fn pollutants_covered(&self, standard: Standard) -> Vec<Pollutant> {
        Pollutant::ALL
            .into_iter()
            .filter(|&p| !self.entries(standard, p).is_empty())
            .collect()
    }

    /// Flattens the table back into records, ordered by standard, pollutant
    /// and period.
    pub fn records(&self) -> Vec<LimitRecord> {
        self.entries
            .iter()
            .flat_map(|(&(standard, pollutant), entries)| {
                entries.iter().map(move |entry| LimitRecord {
                    standard,
                    pollutant,
                    period: entry.period,
                    threshold: entry.threshold,
                    annual_allowed: entry.annual_allowed,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks UK coverage and that every exceedance rule can find the
    /// threshold and allowance it needs.
    fn validate(&self) -> Result<(), EngineError> {
        for pollutant in Pollutant::ALL {
            if self.entries(Standard::Uk, pollutant).is_empty() {
                return Err(EngineError::InvalidLimitTable(format!(
                    "no UK limit defined for {}",
                    pollutant
                )));
            }

            for standard in Standard::ALL {
                let rule = rule_for(pollutant, standard);
                let entry = self.get(standard, pollutant, rule.period).ok_or_else(|| {
                    EngineError::InvalidLimitTable(format!(
                        "{} {} requires a {} limit",
                        standard, pollutant, rule.period
                    ))
                })?;

                let allowance = match rule.allowance {
                    Allowance::None => continue,
                    Allowance::Own => entry.annual_allowed,
                    Allowance::Statutory => self
                        .get(Standard::Uk, pollutant, rule.period)
                        .and_then(|uk| uk.annual_allowed),
                };
                if allowance.is_none() {
                    return Err(EngineError::InvalidLimitTable(format!(
                        "{} {} requires an annual allowance on the UK {} limit",
                        standard, pollutant, rule.period
                    )));
                }
            }
        }
        Ok(())
    }
}

fn index_records(records: Vec<LimitRecord>) -> BTreeMap<(Standard, Pollutant), Vec<LimitEntry>> {
    let mut entries: BTreeMap<(Standard, Pollutant), Vec<LimitEntry>> = BTreeMap::new();
    for record in records {
        entries
            .entry((record.standard, record.pollutant))
            .or_default()
            .push(LimitEntry {
                period: record.period,
                threshold: record.threshold,
                annual_allowed: record.annual_allowed,
            });
    }
    for list in entries.values_mut() {
        list.sort_by_key(|entry| entry.period);
    }
    entries
}

// ---------------------------------------------------------------------------
// Built-in values
// ---------------------------------------------------------------------------

/// UK Air Quality Standards Regulations 2010 limit values and WHO 2021
/// guideline levels.
fn builtin_records() -> Vec<LimitRecord> {
    fn record(
        standard: Standard,
        pollutant: Pollutant,
        period: Period,
        threshold: f64,
        annual_allowed: Option<u32>,
    ) -> LimitRecord {
        LimitRecord {
            standard,
            pollutant,
            period,
            threshold,
            annual_allowed,
        }
    }

    use Period::*;
    use Pollutant::*;
    use Standard::*;

    vec![
        record(Uk, Pm25, Annual, 20.0, None),
        record(Uk, Pm10, Daily, 50.0, Some(35)),
        record(Uk, Pm10, Annual, 40.0, None),
        record(Uk, No2, Hourly, 200.0, Some(18)),
        record(Uk, No2, Annual, 40.0, None),
        record(Uk, So2, Daily, 125.0, Some(3)),
        record(Uk, O3, EightHour, 120.0, Some(10)),
        record(Who, Pm25, Daily, 15.0, None),
        record(Who, Pm10, Daily, 45.0, None),
        record(Who, O3, EightHour, 100.0, None),
        record(Who, No2, Daily, 25.0, None),
        record(Who, So2, Daily, 40.0, None),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
