//! Portfolio risk metrics calculation.
//!
//! Provides sample volatility, Sharpe ratio and max drawdown.

/// Sample standard deviation (ddof = 1).
///
/// `None` for fewer than two returns. A sequence of identical returns has a
/// standard deviation of exactly zero.
pub fn sample_std_dev(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let first = returns[0];
    if returns.iter().all(|&r| r == first) {
        return Some(0.0);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

/// Calculate annualized volatility from returns.
///
/// # Arguments
///
/// * `returns` - Single-period returns
/// * `periods_per_year` - Annualization factor (252 for daily data)
///
/// # Returns
///
/// Sample standard deviation times `sqrt(periods_per_year)`, as a decimal.
pub fn annualized_volatility(returns: &[f64], periods_per_year: u32) -> Option<f64> {
    sample_std_dev(returns).map(|std| std * (periods_per_year as f64).sqrt())
}

/// Calculate the Sharpe ratio from annualized figures.
///
/// # Arguments
///
/// * `annualized_return` - Annualized portfolio return
/// * `annualized_volatility` - Annualized volatility, `None` when undefined
/// * `risk_free_rate` - Annual risk-free rate
///
/// # Returns
///
/// `(annualized_return - risk_free_rate) / annualized_volatility`, or `None`
/// when volatility is undefined or exactly zero.
pub fn sharpe_ratio(
    annualized_return: f64,
    annualized_volatility: Option<f64>,
    risk_free_rate: f64,
) -> Option<f64> {
    match annualized_volatility {
        Some(vol) if vol > 0.0 => Some((annualized_return - risk_free_rate) / vol),
        _ => None,
    }
}

/// Calculate maximum drawdown from a series of returns.
///
/// Wealth starts at 1.0, so a loss on the first period counts. Returns the
/// largest peak-to-trough decline as a decimal (e.g., 0.15 for 15% drawdown).
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut wealth = 1.0;
    let mut running_max = 1.0;
    let mut max_drawdown = 0.0;

    for r in returns {
        wealth *= 1.0 + r;
        if wealth > running_max {
            running_max = wealth;
        }
        let drawdown = (running_max - wealth) / running_max;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    max_drawdown
}
