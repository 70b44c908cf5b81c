//! Per-station and whole-selection compliance reports.
//!
//! These bundle the engine operations the dashboard runs on every filter
//! change: one `StationReport` per selected site for the station cards, one
//! `YearlyExceedance` per site and calendar year for the exceedance chart,
//! and one `DashboardSummary` for the KPI tiles, statistics panel and
//! completeness bars.

use crate::alert::exceedance::compute_exceedance;
use crate::alert::status::{Status, StatusMode, classify_status};
use crate::analysis::aggregate;
use crate::analysis::round_to_tenth;
use crate::analysis::statistics::{
    SiteCompleteness, SummaryStats, compute_completeness, compute_completeness_by_site,
    compute_summary_stats,
};
use crate::limits::LimitTable;
use crate::logging::{self, EngineArea};
use crate::model::{
    EngineError, ExceedanceKind, ExceedanceResult, Measurement, Pollutant, Standard,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Pollutants whose mean is always shown in the headline tiles, whatever
/// pollutant is selected.
pub const HEADLINE_POLLUTANTS: [Pollutant; 2] = [Pollutant::No2, Pollutant::Pm25];

/// Compliance figures for one monitoring site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReport {
    pub site: String,
    /// Rows in the window for this site, including rows without a value.
    pub observations: usize,
    pub exceedance: ExceedanceResult,
    pub exceedance_status: Status,
    pub completeness_pct: f64,
    pub completeness_status: Status,
    /// `true` when the count for any single calendar year in the window is
    /// above the annual allowance.
    pub over_allowance: bool,
}

/// How a site-year compares with its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceVerdict {
    Above,
    Within,
    NoData,
}

/// Exceedance metric for one site in one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyExceedance {
    pub site: String,
    pub year: i32,
    pub exceedance: ExceedanceResult,
    pub verdict: AllowanceVerdict,
}

/// Mean concentration tile for one pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantMean {
    pub pollutant: Pollutant,
    /// Mean of the values present, one decimal. `None` when not measured.
    pub mean: Option<f64>,
    /// Number of values behind the mean.
    pub observations: usize,
    pub status: Status,
}

/// Compliance figures for the whole selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub pollutant: Pollutant,
    pub standard: Standard,
    pub exceedance: ExceedanceResult,
    pub exceedance_status: Status,
    pub completeness_pct: f64,
    pub completeness_status: Status,
    pub stats: SummaryStats,
    pub completeness_by_site: Vec<SiteCompleteness>,
    /// NO2 and PM2.5 means over every row handed in.
    pub headline: Vec<PollutantMean>,
}

impl DashboardSummary {
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Status colour for an exceedance tile.
///
/// Counts are classified against their limit. A mean is always shown as a
/// warning, and a no-data result as good.
pub fn exceedance_status(result: &ExceedanceResult) -> Status {
    match result.kind {
        ExceedanceKind::Count => {
            classify_status(Some(result.value), result.limit, StatusMode::Exceedance)
        }
        ExceedanceKind::Mean => Status::Warning,
        ExceedanceKind::None => Status::Good,
    }
}

fn completeness_status(pct: f64) -> Status {
    classify_status(Some(pct), 100.0, StatusMode::Completeness)
}

/// Compares a result with its limit. Means and counts alike are above
/// only when strictly greater.
pub fn allowance_verdict(result: &ExceedanceResult) -> AllowanceVerdict {
    if result.is_no_data() {
        AllowanceVerdict::NoData
    } else if result.value > result.limit {
        AllowanceVerdict::Above
    } else {
        AllowanceVerdict::Within
    }
}

fn rows_for(series: &[Measurement], pollutant: Pollutant) -> Vec<Measurement> {
    series.iter().filter(|m| m.pollutant == pollutant).cloned().collect()
}

/// Calendar years from the first to the last row, or `None` without rows.
fn year_span(rows: &[Measurement]) -> Option<RangeInclusive<i32>> {
    let mut years = rows.iter().map(|m| m.timestamp.year());
    let first = years.next()?;
    let (lo, hi) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    Some(lo..=hi)
}

fn exceedance_by_year(
    rows: &[Measurement],
    years: RangeInclusive<i32>,
    pollutant: Pollutant,
    standard: Standard,
    limits: &LimitTable,
) -> Result<Vec<(i32, ExceedanceResult)>, EngineError> {
    years
        .map(|year| {
            let in_year: Vec<Measurement> =
                rows.iter().filter(|m| m.timestamp.year() == year).cloned().collect();
            Ok((year, compute_exceedance(&in_year, pollutant, standard, limits)?))
        })
        .collect()
}

/// One report per requested site that has at least one row in `series`,
/// in the order requested.
pub fn station_reports<S: AsRef<str>>(
    series: &[Measurement],
    sites: &[S],
    pollutant: Pollutant,
    standard: Standard,
    limits: &LimitTable,
) -> Result<Vec<StationReport>, EngineError> {
    let series = rows_for(series, pollutant);
    let mut reports = Vec::with_capacity(sites.len());

    for site in sites.iter().map(AsRef::as_ref) {
        let rows: Vec<Measurement> = series.iter().filter(|m| m.site == site).cloned().collect();
        let Some(years) = year_span(&rows) else {
            logging::debug(EngineArea::Report, Some(site), "No rows in window, no station card");
            continue;
        };

        let exceedance = compute_exceedance(&rows, pollutant, standard, limits)?;
        let completeness_pct = compute_completeness(&rows);
        let over_allowance = exceedance.kind == ExceedanceKind::Count
            && exceedance_by_year(&rows, years, pollutant, standard, limits)?
                .iter()
                .any(|(_, yearly)| allowance_verdict(yearly) == AllowanceVerdict::Above);
        if over_allowance {
            logging::warn(
                EngineArea::Report,
                Some(site),
                &format!("{} ({})", exceedance.label, exceedance.value),
            );
        }

        reports.push(StationReport {
            site: site.to_string(),
            observations: rows.len(),
            exceedance_status: exceedance_status(&exceedance),
            exceedance,
            completeness_pct,
            completeness_status: completeness_status(completeness_pct),
            over_allowance,
        });
    }

    Ok(reports)
}

/// Exceedance for every requested site and every calendar year the
/// `pollutant` rows span, site by site in the order requested.
///
/// A site-year without rows is reported as `NoData`, so every site gets
/// the same run of years. Empty when there are no `pollutant` rows at all.
pub fn yearly_exceedance<S: AsRef<str>>(
    series: &[Measurement],
    sites: &[S],
    pollutant: Pollutant,
    standard: Standard,
    limits: &LimitTable,
) -> Result<Vec<YearlyExceedance>, EngineError> {
    let series = rows_for(series, pollutant);
    let Some(years) = year_span(&series) else {
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    for site in sites.iter().map(AsRef::as_ref) {
        let rows: Vec<Measurement> = series.iter().filter(|m| m.site == site).cloned().collect();
        let by_year = exceedance_by_year(&rows, years.clone(), pollutant, standard, limits)?;
        for (year, exceedance) in by_year {
            let verdict = allowance_verdict(&exceedance);
            if verdict == AllowanceVerdict::Above {
                logging::debug(
                    EngineArea::Report,
                    Some(site),
                    &format!("{}: {} ({})", year, exceedance.label, exceedance.value),
                );
            }
            results.push(YearlyExceedance {
                site: site.to_string(),
                year,
                exceedance,
                verdict,
            });
        }
    }
    Ok(results)
}

/// Mean of the `pollutant` values in `series` with its observation count.
///
/// A measured PM2.5 mean is shown as a warning, any other as good.
pub fn pollutant_mean(series: &[Measurement], pollutant: Pollutant) -> PollutantMean {
    let values: Vec<f64> = series
        .iter()
        .filter(|m| m.pollutant == pollutant)
        .filter_map(Measurement::usable_value)
        .collect();
    let mean = aggregate::mean(&values).map(round_to_tenth);
    let status = match (mean, pollutant) {
        (Some(_), Pollutant::Pm25) => Status::Warning,
        _ => Status::Good,
    };

    PollutantMean {
        pollutant,
        mean,
        observations: values.len(),
        status,
    }
}

/// The headline NO2 and PM2.5 mean tiles.
pub fn headline_means(series: &[Measurement]) -> Vec<PollutantMean> {
    HEADLINE_POLLUTANTS
        .into_iter()
        .map(|pollutant| pollutant_mean(series, pollutant))
        .collect()
}

/// Summary of the whole selection for the dashboard tiles.
///
/// `series` may hold every pollutant for the selected sites and window.
/// The headline means read all of it; every other figure covers only the
/// rows for `pollutant`.
pub fn summarize<S: AsRef<str>>(
    series: &[Measurement],
    sites: &[S],
    pollutant: Pollutant,
    standard: Standard,
    limits: &LimitTable,
) -> Result<DashboardSummary, EngineError> {
    let rows = rows_for(series, pollutant);
    let exceedance = compute_exceedance(&rows, pollutant, standard, limits)?;
    let completeness_pct = compute_completeness(&rows);

    Ok(DashboardSummary {
        pollutant,
        standard,
        exceedance_status: exceedance_status(&exceedance),
        exceedance,
        completeness_pct,
        completeness_status: completeness_status(completeness_pct),
        stats: compute_summary_stats(&rows),
        completeness_by_site: compute_completeness_by_site(&rows, sites),
        headline: headline_means(series),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
