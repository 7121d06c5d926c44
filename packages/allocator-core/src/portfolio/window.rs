//! Date-range filtering of portfolio returns.

use super::performance::{summarize, SummaryOptions};
use crate::types::{DateWindow, PerformanceSummary, PortfolioReturnSeries};
use crate::{Error, Result};
use chrono::NaiveDate;

/// Returns dated `start..=end`, as a new series.
///
/// An empty input series is `NoData`; a window that selects nothing from a
/// non-empty series is `EmptyWindow`.
pub fn filter_window(
    series: &PortfolioReturnSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PortfolioReturnSeries> {
    let window = DateWindow::new(start, end)?;
    if series.is_empty() {
        return Err(Error::NoData("portfolio return series is empty".to_string()));
    }

    let points = series.points();
    let lo = points.partition_point(|p| p.date < window.start);
    let hi = points.partition_point(|p| p.date <= window.end);
    if lo >= hi {
        return Err(Error::EmptyWindow { start, end });
    }

    Ok(PortfolioReturnSeries::from_sorted(points[lo..hi].to_vec()))
}

/// Returns dated within calendar years `first_year..=last_year`.
pub fn filter_years(
    series: &PortfolioReturnSeries,
    first_year: i32,
    last_year: i32,
) -> Result<PortfolioReturnSeries> {
    let window = DateWindow::years(first_year, last_year)?;
    filter_window(series, window.start, window.end)
}

/// Filter to a window and summarize the slice. Cumulative return restarts at
/// the window's first observation, and `Auto` annualizes with the compound
/// form.
pub fn summarize_window(
    series: &PortfolioReturnSeries,
    start: NaiveDate,
    end: NaiveDate,
    options: &SummaryOptions,
) -> Result<PerformanceSummary> {
    let filtered = filter_window(series, start, end)?;
    Ok(summarize(&filtered, &options.for_window()))
}
