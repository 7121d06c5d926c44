//! Calendar-year performance buckets.
//!
//! The first return of a new year spans the last trading day of the previous
//! year to the first trading day of this one. It is dropped from every bucket
//! except the first year present, so each later bucket counts one fewer
//! observation than the year's raw returns.

use super::performance::{compound_annualized_return, total_return};
use super::risk::annualized_volatility;
use crate::types::{PortfolioReturnSeries, YearBucketSummary};
use chrono::Datelike;

/// Per-year annualized return and volatility with the carry-day correction.
///
/// Bucket returns are annualized with the compound form over the corrected
/// observation count. A bucket left empty by the correction reports
/// undefined metrics.
pub fn year_buckets(series: &PortfolioReturnSeries, periods_per_year: u32) -> Vec<YearBucketSummary> {
    let points = series.points();
    let mut buckets = Vec::new();
    let mut wealth = 1.0;
    let mut start = 0;

    while start < points.len() {
        let year = points[start].date.year();
        let len = points[start..]
            .iter()
            .take_while(|p| p.date.year() == year)
            .count();
        let group = &points[start..start + len];

        for p in group {
            wealth *= 1.0 + p.value;
        }

        let skip = if start == 0 { 0 } else { 1 };
        let counted: Vec<f64> = group[skip..].iter().map(|p| p.value).collect();

        buckets.push(YearBucketSummary {
            year,
            observations: counted.len(),
            total_return: (!counted.is_empty()).then(|| total_return(&counted)),
            annualized_return: compound_annualized_return(&counted, periods_per_year),
            annualized_volatility: annualized_volatility(&counted, periods_per_year),
            cumulative_return_at_year_end: wealth - 1.0,
        });

        start += len;
    }

    buckets
}
