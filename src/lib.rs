//! Air-quality compliance engine for the AirLens dashboard.
//!
//! Given a measurement series already filtered to a set of monitoring
//! sites, one pollutant and a date window, the engine computes the
//! regulatory exceedance metric for the selected standard (UK statutory
//! limits or WHO guidelines), data completeness, summary statistics and a
//! three-tier status for each figure.
//!
//! Every operation is a pure function of its inputs. The only shared state
//! is the regulatory `LimitTable`, which is immutable once built.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod format;
pub mod limits;
pub mod logging;
pub mod model;
pub mod report;
pub mod window;

pub use alert::status::{Status, StatusMode};
pub use analysis::statistics::{
    CompletenessReport, CompletenessTier, SiteCompleteness, SummaryStats,
};
pub use limits::{LimitEntry, LimitTable, Period};
pub use model::{EngineError, ExceedanceKind, ExceedanceResult, Measurement, Pollutant, Standard};
pub use report::{
    AllowanceVerdict, DashboardSummary, PollutantMean, StationReport, YearlyExceedance,
};
pub use window::DateWindow;

/// Compliance engine bound to a regulatory limit table.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceEngine<'a> {
    limits: &'a LimitTable,
}

impl ComplianceEngine<'static> {
    /// Engine over the built-in UK and WHO limit table.
    pub fn builtin() -> Self {
        Self::new(LimitTable::builtin())
    }
}

impl Default for ComplianceEngine<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> ComplianceEngine<'a> {
    pub fn new(limits: &'a LimitTable) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &'a LimitTable {
        self.limits
    }

    /// Exceedance metric for `pollutant` under `standard`.
    pub fn compute_exceedance(
        &self,
        series: &[Measurement],
        pollutant: Pollutant,
        standard: Standard,
    ) -> Result<ExceedanceResult, EngineError> {
        alert::exceedance::compute_exceedance(series, pollutant, standard, self.limits)
    }

    /// Percentage of rows carrying a value, 0–100, one decimal.
    pub fn compute_completeness(&self, series: &[Measurement]) -> f64 {
        analysis::statistics::compute_completeness(series)
    }

    /// Completeness for each requested site that has rows in the series.
    pub fn compute_completeness_by_site<S: AsRef<str>>(
        &self,
        series: &[Measurement],
        sites: &[S],
    ) -> Vec<SiteCompleteness> {
        analysis::statistics::compute_completeness_by_site(series, sites)
    }

    /// Overall plus per-site completeness.
    pub fn completeness_report<S: AsRef<str>>(
        &self,
        series: &[Measurement],
        sites: &[S],
    ) -> CompletenessReport {
        analysis::statistics::completeness_report(series, sites)
    }

    pub fn compute_summary_stats(&self, series: &[Measurement]) -> SummaryStats {
        analysis::statistics::compute_summary_stats(series)
    }

    pub fn classify_status(&self, value: Option<f64>, limit: f64, mode: StatusMode) -> Status {
        alert::status::classify_status(value, limit, mode)
    }

    /// Station cards for each requested site with rows in the series.
    pub fn station_reports<S: AsRef<str>>(
        &self,
        series: &[Measurement],
        sites: &[S],
        pollutant: Pollutant,
        standard: Standard,
    ) -> Result<Vec<StationReport>, EngineError> {
        report::station_reports(series, sites, pollutant, standard, self.limits)
    }

    /// Exceedance for each requested site and calendar year.
    pub fn yearly_exceedance<S: AsRef<str>>(
        &self,
        series: &[Measurement],
        sites: &[S],
        pollutant: Pollutant,
        standard: Standard,
    ) -> Result<Vec<YearlyExceedance>, EngineError> {
        report::yearly_exceedance(series, sites, pollutant, standard, self.limits)
    }

    /// Headline NO2 and PM2.5 mean tiles.
    pub fn headline_means(&self, series: &[Measurement]) -> Vec<PollutantMean> {
        report::headline_means(series)
    }

    /// All dashboard figures for the selection in one call.
    pub fn summarize<S: AsRef<str>>(
        &self,
        series: &[Measurement],
        sites: &[S],
        pollutant: Pollutant,
        standard: Standard,
    ) -> Result<DashboardSummary, EngineError> {
        report::summarize(series, sites, pollutant, standard, self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series() -> Vec<Measurement> {
        let noon = NaiveDate::from_ymd_opt(2023, 8, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        vec![
            Measurement::new(noon, "Cardiff Centre", Pollutant::Pm25, Some(12.0)),
            Measurement::new(noon, "Newport", Pollutant::Pm25, None),
        ]
    }

    #[test]
    fn test_engine_delegates_to_builtin_table() {
        let engine = ComplianceEngine::default();
        let result = engine
            .compute_exceedance(&series(), Pollutant::Pm25, Standard::Uk)
            .unwrap();
        assert_eq!(result.kind, ExceedanceKind::Mean);
        assert_eq!(result.value, 12.0);
        assert_eq!(engine.compute_completeness(&series()), 50.0);
    }

    #[test]
    fn test_engine_over_custom_table() {
        let mut records = LimitTable::builtin().records();
        for record in &mut records {
            if record.standard == Standard::Uk && record.pollutant == Pollutant::Pm25 {
                record.threshold = 10.0;
            }
        }
        let table = LimitTable::from_records(records).unwrap();
        let engine = ComplianceEngine::new(&table);

        let result = engine
            .compute_exceedance(&series(), Pollutant::Pm25, Standard::Uk)
            .unwrap();
        assert_eq!(result.limit, 10.0);
        assert_eq!(result.label, "Annual mean (limit: 10 μg/m³)");
    }

    #[test]
    fn test_engine_status_and_stats() {
        let engine = ComplianceEngine::builtin();
        assert_eq!(
            engine.classify_status(Some(9.0), 18.0, StatusMode::Exceedance),
            Status::Warning
        );
        assert_eq!(engine.compute_summary_stats(&series()).mean, Some(12.0));
        assert_eq!(
            engine.completeness_report(&series(), &["Newport"]).sites[0].completeness_pct,
            0.0
        );
    }
}
