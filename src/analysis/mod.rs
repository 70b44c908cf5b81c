/// Time-series reduction for the compliance engine.
///
/// Submodules:
/// - `aggregate`: calendar-day grouping, rolling means and threshold counts.
/// - `statistics`: completeness ratios and descriptive summary statistics.

pub mod aggregate;
pub mod statistics;

/// Rounds to one decimal place. Exact halves go to the even digit, so
/// `6.25` becomes `6.2` and `0.75` becomes `0.8`.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
