//! Portfolio construction and analytics.
//!
//! Aligns per-asset returns, applies weights, and derives performance
//! metrics, calendar-year buckets and windowed summaries.

mod aggregate;
mod align;
mod calendar;
mod performance;
mod risk;
mod sweep;
mod weights;
mod window;

pub use aggregate::aggregate;
pub use align::{align, align_by_date, align_by_tail, AlignedPanel, AlignmentPolicy};
pub use calendar::year_buckets;
pub use performance::{
    additive_cumulative_returns, annualized_return, compound_annualized_return,
    cumulative_returns, mean_annualized_return, resolve_method, summarize, total_return,
    SummaryOptions, FULL_YEAR_TOLERANCE, TRADING_DAYS_PER_YEAR,
};
pub use risk::{annualized_volatility, max_drawdown, sample_std_dev, sharpe_ratio};
pub use sweep::{allocation_sweep, SweepPoint, MIN_SWEEP_STEP};
pub use weights::{AssetWeight, SplitPoints, WeightVector, WEIGHT_SUM_TOLERANCE};
pub use window::{filter_window, filter_years, summarize_window};
