/// Integration tests for the dashboard data flow
///
/// Tests verify:
/// 1. Raw rows are narrowed by site, pollutant and date window
/// 2. The date picker bounds follow the selected sites
/// 3. KPI, statistics and station-card figures for a filtered selection
/// 4. Switching the threshold standard changes only the exceedance figures
/// 5. Headline mean tiles and the per-year exceedance chart
/// 6. Engine configuration and limit tables load from TOML on disk
///
/// Run with: cargo test --test dashboard_pipeline

use airlens_engine::config::EngineConfig;
use airlens_engine::format::{completeness_note, format_date_range, format_statistic};
use airlens_engine::window::{allowed_window, filter_series, parse_timestamp};
use airlens_engine::{
    AllowanceVerdict, ComplianceEngine, CompletenessTier, DateWindow, ExceedanceKind, LimitTable,
    Measurement, Pollutant, Standard, Status,
};
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Hourly PM10 readings for two sites over ten days in March 2024, plus
/// NO2 rows that the filter must drop.
///
/// - Cardiff Centre: 30 μg/m³ except days 3 and 4 at 60 μg/m³; every
///   fourth hour on day 10 is missing.
/// - Port Talbot: 48 μg/m³ throughout, but only from day 5 onwards.
fn dataset() -> Vec<Measurement> {
    let start = parse_timestamp("2024-03-01 00:00:00").unwrap();
    let mut rows = Vec::new();

    for hour in 0..(10 * 24) {
        let ts = start + Duration::hours(hour);
        let day = hour / 24 + 1;

        let cardiff = match day {
            3 | 4 => Some(60.0),
            10 if hour % 4 == 0 => None,
            _ => Some(30.0),
        };
        rows.push(Measurement::new(ts, "Cardiff Centre", Pollutant::Pm10, cardiff));
        rows.push(Measurement::new(ts, "Cardiff Centre", Pollutant::No2, Some(250.0)));

        if day >= 5 {
            rows.push(Measurement::new(ts, "Port Talbot", Pollutant::Pm10, Some(48.0)));
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn test_date_bounds_follow_site_selection() {
    let data = dataset();

    assert_eq!(
        allowed_window(&data, &["Cardiff Centre"], Pollutant::Pm10),
        Some(DateWindow { start: date(2024, 3, 1), end: date(2024, 3, 10) })
    );
    assert_eq!(
        allowed_window(&data, &["Cardiff Centre", "Port Talbot"], Pollutant::Pm10),
        Some(DateWindow { start: date(2024, 3, 5), end: date(2024, 3, 10) })
    );
    assert_eq!(allowed_window(&data, &["Port Talbot"], Pollutant::No2), None);
}

#[test]
fn test_filter_keeps_only_selected_pollutant_sites_and_days() {
    let data = dataset();
    let window = DateWindow::new(date(2024, 3, 3), date(2024, 3, 4)).unwrap();
    let series = filter_series(&data, &["Cardiff Centre"], Pollutant::Pm10, &window);

    assert_eq!(series.len(), 48);
    assert!(series.iter().all(|m| m.pollutant == Pollutant::Pm10));
    assert!(series.iter().all(|m| m.value == Some(60.0)));
}

// ---------------------------------------------------------------------------
// Dashboard figures
// ---------------------------------------------------------------------------

#[test]
fn test_full_period_summary_for_both_sites() {
    let data = dataset();
    let sites = ["Cardiff Centre", "Port Talbot"];
    let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
    let series = filter_series(&data, &sites, Pollutant::Pm10, &window);
    let engine = ComplianceEngine::builtin();

    let uk = engine.summarize(&series, &sites, Pollutant::Pm10, Standard::Uk).unwrap();
    // Days 3-4: Cardiff alone at 60. Days 5-9: (30 + 48) / 2 = 39. No day above 50
    // except the two Cardiff-only days.
    assert_eq!(uk.exceedance.kind, ExceedanceKind::Count);
    assert_eq!(uk.exceedance.value, 2.0);
    assert_eq!(uk.exceedance.limit, 35.0);
    assert_eq!(uk.exceedance_status, Status::Warning);

    // 240 + 144 rows, 6 missing.
    assert_eq!(uk.completeness_pct, 98.4);
    assert_eq!(uk.completeness_status, Status::Good);

    let cardiff = &uk.completeness_by_site[0];
    assert_eq!(cardiff.site, "Cardiff Centre");
    assert_eq!(cardiff.completeness_pct, 97.5);
    assert_eq!(cardiff.tier, CompletenessTier::High);

    assert_eq!(uk.stats.min, Some(30.0));
    assert_eq!(uk.stats.max, Some(60.0));
    // 186 readings at 30, 144 at 48, 48 at 60.
    assert_eq!(format_statistic(uk.stats.median), "48.0");

    // WHO threshold is 45: the two Cardiff days still count, and the
    // daily mean of 39 on shared days stays below it.
    let who = engine.summarize(&series, &sites, Pollutant::Pm10, Standard::Who).unwrap();
    assert_eq!(who.exceedance.value, 2.0);
    assert_eq!(who.exceedance.label, "Days exceeding 45 μg/m³ (max 35/year)");
    assert_eq!(who.stats, uk.stats);
    assert_eq!(who.completeness_by_site, uk.completeness_by_site);
}

#[test]
fn test_station_cards_evaluate_each_site_alone() {
    let data = dataset();
    let sites = ["Cardiff Centre", "Port Talbot"];
    let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
    let series = filter_series(&data, &sites, Pollutant::Pm10, &window);
    let engine = ComplianceEngine::builtin();

    let who = engine
        .station_reports(&series, &sites, Pollutant::Pm10, Standard::Who)
        .unwrap();
    assert_eq!(who.len(), 2);

    // Port Talbot alone: 48 > 45 on each of its six days.
    let port_talbot = &who[1];
    assert_eq!(port_talbot.site, "Port Talbot");
    assert_eq!(port_talbot.observations, 144);
    assert_eq!(port_talbot.exceedance.value, 6.0);
    assert!(!port_talbot.over_allowance);
    assert_eq!(port_talbot.completeness_pct, 100.0);

    let uk = engine
        .station_reports(&series, &sites, Pollutant::Pm10, Standard::Uk)
        .unwrap();
    assert_eq!(uk[1].exceedance.value, 0.0);
    assert_eq!(uk[1].exceedance_status, Status::Good);
}

#[test]
fn test_headline_tiles_read_every_pollutant_in_the_window() {
    let data = dataset();
    let sites = ["Cardiff Centre", "Port Talbot"];
    let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
    let rows: Vec<Measurement> = data
        .iter()
        .filter(|m| window.contains(&m.timestamp))
        .cloned()
        .collect();

    let summary = ComplianceEngine::builtin()
        .summarize(&rows, &sites, Pollutant::Pm10, Standard::Uk)
        .unwrap();

    let no2 = &summary.headline[0];
    assert_eq!(no2.pollutant, Pollutant::No2);
    assert_eq!(no2.mean, Some(250.0));
    assert_eq!(no2.observations, 240);
    assert_eq!(summary.headline[1].mean, None);

    // The NO2 rows do not dilute the PM10 figures.
    assert_eq!(summary.completeness_pct, 98.4);
    assert_eq!(summary.stats.max, Some(60.0));
}

#[test]
fn test_yearly_chart_within_a_single_year() {
    let data = dataset();
    let sites = ["Cardiff Centre", "Port Talbot"];
    let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
    let series = filter_series(&data, &sites, Pollutant::Pm10, &window);

    let yearly = ComplianceEngine::builtin()
        .yearly_exceedance(&series, &sites, Pollutant::Pm10, Standard::Who)
        .unwrap();

    assert_eq!(yearly.len(), 2);
    assert!(yearly.iter().all(|y| y.year == 2024));
    assert_eq!(yearly[0].exceedance.value, 2.0);
    assert_eq!(yearly[1].site, "Port Talbot");
    assert_eq!(yearly[1].exceedance.value, 6.0);
    assert!(yearly.iter().all(|y| y.verdict == AllowanceVerdict::Within));
}

#[test]
fn test_empty_selection_renders_placeholders() {
    let data = dataset();
    let window = DateWindow::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();
    let series = filter_series(&data, &["Cardiff Centre"], Pollutant::Pm10, &window);
    assert!(series.is_empty());

    let summary = ComplianceEngine::builtin()
        .summarize(&series, &["Cardiff Centre"], Pollutant::Pm10, Standard::Uk)
        .unwrap();
    assert!(summary.exceedance.is_no_data());
    assert_eq!(summary.completeness_pct, 0.0);
    assert!(summary.completeness_by_site.is_empty());
    assert_eq!(format_statistic(summary.stats.mean), "--");
    assert_eq!(completeness_note(summary.completeness_pct), "Significant gaps");
    assert_eq!(
        format_date_range(Some(window.start), Some(window.end)),
        "Jan – Jan 2025"
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_with_custom_limit_table_changes_thresholds() {
    let dir = std::env::temp_dir().join(format!("airlens_pipeline_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let custom = LimitTable::builtin()
        .to_toml_string()
        .unwrap()
        .replace("threshold = 50.0", "threshold = 25.0");
    std::fs::write(dir.join("strict_limits.toml"), custom).unwrap();
    std::fs::write(
        dir.join("engine.toml"),
        "standard = \"UK\"\nlimits_file = \"strict_limits.toml\"\n",
    )
    .unwrap();

    let config = EngineConfig::load(dir.join("engine.toml")).unwrap();
    let table = config.limit_table().unwrap();
    let engine = ComplianceEngine::new(&table);

    let data = dataset();
    let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
    let series = filter_series(&data, &["Port Talbot"], Pollutant::Pm10, &window);
    let result = engine
        .compute_exceedance(&series, Pollutant::Pm10, config.standard)
        .unwrap();
    assert_eq!(result.value, 6.0);
    assert_eq!(result.label, "Days exceeding 25 μg/m³ (max 35/year)");

    std::fs::remove_dir_all(&dir).ok();
}
