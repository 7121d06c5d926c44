//! Per-asset return construction.
//!
//! Normalizes loader-supplied text and turns one asset's observations into a
//! lag-1 total-return series.

mod builder;
mod normalize;

pub use builder::{build, build_from_observations, parse_observations, BuildOutcome};
pub use normalize::{normalize_numeric_text, parse_date, parse_dividend, parse_price};
