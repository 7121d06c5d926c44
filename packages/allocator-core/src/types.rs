//! Core value types shared across the engine.

use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Observation as handed over by a loader, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Date text (ISO, slash or CJK glyph form)
    pub date: String,
    /// Price text, possibly quoted or with grouping separators
    pub price: String,
    /// Dividend text, absent when the source has no dividend column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend: Option<String>,
}

impl RawObservation {
    /// Create a raw observation without a dividend.
    pub fn new(date: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            price: price.into(),
            dividend: None,
        }
    }

    /// Attach dividend text.
    pub fn with_dividend(mut self, dividend: impl Into<String>) -> Self {
        self.dividend = Some(dividend.into());
        self
    }
}

/// One parsed trading-day observation.
///
/// `price` is NaN when the source value could not be normalized; the slot is
/// kept so that the following observation has no prior price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub price: f64,
    pub dividend: f64,
}

impl Observation {
    /// Create an observation with zero dividend.
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            price,
            dividend: 0.0,
        }
    }

    /// Set the dividend paid on this date.
    pub fn with_dividend(mut self, dividend: f64) -> Self {
        self.dividend = dividend;
        self
    }

    /// Whether the price is usable (finite and non-negative).
    pub fn has_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

/// A dated single-period return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ReturnPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

fn check_points(points: &[ReturnPoint]) -> Result<()> {
    if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(Error::Configuration(format!(
            "return on {} is not finite",
            bad.date
        )));
    }
    if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
        return Err(Error::Configuration(format!(
            "return dates must be strictly increasing ({} then {})",
            pair[0].date, pair[1].date
        )));
    }
    Ok(())
}

/// Single-period total returns of one asset, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReturnSeries {
    asset: String,
    points: Vec<ReturnPoint>,
}

impl AssetReturnSeries {
    /// Create a series from already computed returns.
    ///
    /// Fails when a value is not finite or dates are not strictly increasing.
    pub fn from_points(asset: impl Into<String>, points: Vec<ReturnPoint>) -> Result<Self> {
        check_points(&points)?;
        Ok(Self {
            asset: asset.into(),
            points,
        })
    }

    pub(crate) fn from_sorted(asset: String, points: Vec<ReturnPoint>) -> Self {
        Self { asset, points }
    }

    /// Asset identifier.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Weighted portfolio returns on the aligned date grid.
///
/// Derived from a panel and a weight vector; never modified in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortfolioReturnSeries {
    points: Vec<ReturnPoint>,
}

impl PortfolioReturnSeries {
    /// Create a series from dated returns, validating order and finiteness.
    pub fn from_points(points: Vec<ReturnPoint>) -> Result<Self> {
        check_points(&points)?;
        Ok(Self { points })
    }

    pub(crate) fn from_sorted(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Inclusive date range selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Window covering whole calendar years, `first_year` through `last_year`.
    pub fn years(first_year: i32, last_year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(first_year, 1, 1)
            .ok_or_else(|| Error::Configuration(format!("year out of range: {first_year}")))?;
        let end = NaiveDate::from_ymd_opt(last_year, 12, 31)
            .ok_or_else(|| Error::Configuration(format!("year out of range: {last_year}")))?;
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::Configuration(format!(
                "window start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar years touched by the window.
    pub fn year_span(&self) -> (i32, i32) {
        (self.start.year(), self.end.year())
    }
}

/// How a return series was annualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnualizationMethod {
    /// Compound form for a partial year, mean form otherwise
    #[default]
    Auto,
    /// `(1 + mean)^P - 1`
    Mean,
    /// `(1 + total)^(P / n) - 1`
    Compound,
}

/// Performance statistics of a return series.
///
/// `None` marks an undefined metric (empty series, single observation for
/// volatility, zero volatility for Sharpe). It is a value, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    /// Number of returns summarized
    pub observations: usize,
    /// First date in the series
    pub start: Option<NaiveDate>,
    /// Last date in the series
    pub end: Option<NaiveDate>,
    /// Compounded cumulative return after each observation
    pub cumulative_return: Vec<f64>,
    /// Compounded return over the whole series
    pub total_return: Option<f64>,
    /// Annualized return
    pub annualized_return: Option<f64>,
    /// Form used for `annualized_return`
    pub annualization: Option<AnnualizationMethod>,
    /// Periods per year used for annualization
    pub annualization_periods: u32,
    /// Sample standard deviation scaled to one year
    pub annualized_volatility: Option<f64>,
    /// Annual risk-free rate used for the Sharpe ratio
    pub risk_free_rate: f64,
    /// Excess annualized return per unit of annualized volatility
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough decline of the wealth curve (e.g. 0.15 for 15%)
    pub max_drawdown: Option<f64>,
}

/// Annualized performance of one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBucketSummary {
    pub year: i32,
    /// Returns counted after the carry-day correction
    pub observations: usize,
    pub total_return: Option<f64>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    /// Cumulative return from the start of the series to the year's last observation
    pub cumulative_return_at_year_end: f64,
}

/// JSON envelope for command-line output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_observation_has_price() {
        assert!(Observation::new(d(2024, 1, 2), 10.0).has_price());
        assert!(Observation::new(d(2024, 1, 2), 0.0).has_price());
        assert!(!Observation::new(d(2024, 1, 2), f64::NAN).has_price());
        assert!(!Observation::new(d(2024, 1, 2), -1.0).has_price());
    }

    #[test]
    fn test_series_rejects_unsorted_points() {
        let points = vec![
            ReturnPoint::new(d(2024, 1, 3), 0.01),
            ReturnPoint::new(d(2024, 1, 2), 0.02),
        ];
        let result = AssetReturnSeries::from_points("SPY", points);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_series_rejects_duplicate_dates() {
        let points = vec![
            ReturnPoint::new(d(2024, 1, 2), 0.01),
            ReturnPoint::new(d(2024, 1, 2), 0.02),
        ];
        assert!(PortfolioReturnSeries::from_points(points).is_err());
    }

    #[test]
    fn test_series_rejects_nan() {
        let points = vec![ReturnPoint::new(d(2024, 1, 2), f64::NAN)];
        assert!(PortfolioReturnSeries::from_points(points).is_err());
    }

    #[test]
    fn test_date_window_years() {
        let window = DateWindow::years(2010, 2020).unwrap();
        assert_eq!(window.start, d(2010, 1, 1));
        assert_eq!(window.end, d(2020, 12, 31));
        assert_eq!(window.year_span(), (2010, 2020));
        assert!(window.contains(d(2015, 6, 30)));
        assert!(!window.contains(d(2021, 1, 1)));
    }

    #[test]
    fn test_date_window_rejects_inverted_bounds() {
        let result = DateWindow::new(d(2024, 2, 1), d(2024, 1, 1));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
