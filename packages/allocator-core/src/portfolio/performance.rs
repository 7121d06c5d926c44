//! Portfolio performance analytics.
//!
//! All functions take single-period returns as decimals (0.01 for 1%).

use super::risk::{annualized_volatility, max_drawdown, sharpe_ratio};
use crate::types::{AnnualizationMethod, PerformanceSummary, PortfolioReturnSeries};
use serde::{Deserialize, Serialize};

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Relative shortfall from one year of observations below which
/// [`AnnualizationMethod::Auto`] treats a series as a partial year.
pub const FULL_YEAR_TOLERANCE: f64 = 0.05;

/// Inputs to [`summarize`] besides the returns themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryOptions {
    /// Periods per year (252 for daily data)
    pub annualization_periods: u32,
    /// Annual risk-free rate (e.g. 0.02 for 2%)
    pub risk_free_rate: f64,
    /// Annualization form
    pub method: AnnualizationMethod,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            annualization_periods: TRADING_DAYS_PER_YEAR,
            risk_free_rate: 0.0,
            method: AnnualizationMethod::Auto,
        }
    }
}

impl SummaryOptions {
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    pub fn with_periods(mut self, annualization_periods: u32) -> Self {
        self.annualization_periods = annualization_periods;
        self
    }

    pub fn with_method(mut self, method: AnnualizationMethod) -> Self {
        self.method = method;
        self
    }

    /// Options for a date-window slice: `Auto` becomes the compound form.
    pub fn for_window(mut self) -> Self {
        if self.method == AnnualizationMethod::Auto {
            self.method = AnnualizationMethod::Compound;
        }
        self
    }
}

/// Compounded cumulative return after each period: `cumprod(1 + r) - 1`.
///
/// ```rust
/// use allocator_core::portfolio::cumulative_returns;
///
/// let cumulative = cumulative_returns(&[0.10, -0.10]);
/// assert!((cumulative[1] - (-0.01)).abs() < 1e-12);
/// ```
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth - 1.0)
        })
        .collect()
}

/// Running sum of returns.
///
/// Diagnostic only; it disagrees with compounding and with every annualized
/// figure in this module.
pub fn additive_cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(0.0, |sum, r| {
            *sum += r;
            Some(*sum)
        })
        .collect()
}

/// Compounded return over the whole sequence. Zero for an empty sequence.
pub fn total_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

/// `(1 + mean)^periods - 1`.
pub fn mean_annualized_return(returns: &[f64], periods_per_year: u32) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    Some((1.0 + mean).powf(periods_per_year as f64) - 1.0)
}

/// `(1 + total)^(periods / n) - 1`, the geometric rate over `n` observations.
pub fn compound_annualized_return(returns: &[f64], periods_per_year: u32) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let growth = 1.0 + total_return(returns);
    let exponent = periods_per_year as f64 / returns.len() as f64;
    Some(growth.powf(exponent) - 1.0)
}

/// Concrete form that `method` selects for `observations` returns.
///
/// `Auto` picks the compound form only for a partial year, i.e. more than
/// [`FULL_YEAR_TOLERANCE`] short of `periods_per_year` observations. Whole
/// multi-year series keep the mean form.
pub fn resolve_method(
    method: AnnualizationMethod,
    observations: usize,
    periods_per_year: u32,
) -> AnnualizationMethod {
    match method {
        AnnualizationMethod::Auto => {
            let full_year = periods_per_year as f64 * (1.0 - FULL_YEAR_TOLERANCE);
            if (observations as f64) < full_year {
                AnnualizationMethod::Compound
            } else {
                AnnualizationMethod::Mean
            }
        }
        explicit => explicit,
    }
}

/// Annualized return with the form that was used.
pub fn annualized_return(
    returns: &[f64],
    periods_per_year: u32,
    method: AnnualizationMethod,
) -> Option<(f64, AnnualizationMethod)> {
    let resolved = resolve_method(method, returns.len(), periods_per_year);
    let value = match resolved {
        AnnualizationMethod::Mean => mean_annualized_return(returns, periods_per_year),
        _ => compound_annualized_return(returns, periods_per_year),
    }?;
    Some((value, resolved))
}

/// Summarize a return series.
///
/// Undefined metrics come back as `None`; an empty series is not an error.
/// The cumulative curve always starts compounding at the series' first point,
/// so summarizing a filtered window rebases it.
pub fn summarize(series: &PortfolioReturnSeries, options: &SummaryOptions) -> PerformanceSummary {
    let returns = series.values();
    let periods = options.annualization_periods;

    let annualized = annualized_return(&returns, periods, options.method);
    let annualized_volatility = annualized_volatility(&returns, periods);
    let sharpe = annualized.and_then(|(value, _)| {
        sharpe_ratio(value, annualized_volatility, options.risk_free_rate)
    });

    PerformanceSummary {
        observations: returns.len(),
        start: series.first_date(),
        end: series.last_date(),
        cumulative_return: cumulative_returns(&returns),
        total_return: (!returns.is_empty()).then(|| total_return(&returns)),
        annualized_return: annualized.map(|(value, _)| value),
        annualization: annualized.map(|(_, method)| method),
        annualization_periods: periods,
        annualized_volatility,
        risk_free_rate: options.risk_free_rate,
        sharpe_ratio: sharpe,
        max_drawdown: (!returns.is_empty()).then(|| max_drawdown(&returns)),
    }
}
