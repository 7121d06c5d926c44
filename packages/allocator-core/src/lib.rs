//! Allocator Core - Multi-asset return alignment and portfolio performance metrics.
//!
//! This crate turns several independently sourced price histories into one
//! weighted portfolio return series and derives its performance statistics:
//!
//! - **Return building**: text normalization and lag-1 total returns per asset
//! - **Alignment**: date-intersection and tail-trim panels
//! - **Aggregation**: validated weight vectors and split-point weighting
//! - **Metrics**: compounding, annualized return/volatility, Sharpe ratio,
//!   max drawdown and calendar-year buckets with carry-day correction
//! - **Windows**: inclusive date-range filtering with rebased compounding
//!
//! Every engine operation is a pure function of its inputs. Loading CSV files
//! (`ingest`) and reading TOML configuration (`config`) are thin adapters
//! that the engine itself never calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use allocator_core::portfolio::{aggregate, align_by_date, summarize, SummaryOptions, WeightVector};
//! use allocator_core::returns::build;
//! use allocator_core::RawObservation;
//!
//! let spy = build("SPY", &[
//!     RawObservation::new("2024-01-02", "470.10"),
//!     RawObservation::new("2024-01-03", "'468.79'"),
//!     RawObservation::new("2024年1月4日", "467.28"),
//! ]);
//! let tlt = build("TLT", &[
//!     RawObservation::new("2024-01-02", "97.70"),
//!     RawObservation::new("2024-01-03", "98.11").with_dividend("0.31"),
//!     RawObservation::new("2024-01-04", "96.87"),
//! ]);
//!
//! let panel = align_by_date(&[spy.series, tlt.series])?;
//! let weights = WeightVector::new([("SPY", 0.6), ("TLT", 0.4)])?;
//! let portfolio = aggregate(&panel, &weights)?;
//! let summary = summarize(&portfolio, &SummaryOptions::default());
//! println!("annualized return: {:?}", summary.annualized_return);
//! # Ok::<(), allocator_core::Error>(())
//! ```

pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod portfolio;
pub mod returns;
pub mod types;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

// Re-export commonly used types
pub use types::{
    AnnualizationMethod, ApiResponse, AssetReturnSeries, DateWindow, Observation,
    PerformanceSummary, PortfolioReturnSeries, RawObservation, ReturnPoint, YearBucketSummary,
};

// Re-export main functionality
pub use config::AnalysisConfig;
pub use pipeline::{analyze, AnalysisReport};
pub use portfolio::{
    aggregate, align, align_by_date, align_by_tail, allocation_sweep, filter_window, filter_years,
    summarize, year_buckets, AlignedPanel, AlignmentPolicy, SplitPoints, SummaryOptions,
    WeightVector,
};
pub use returns::{build, BuildOutcome};

/// Error types for allocator-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("No observations between {start} and {end}")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Ingest error: {0}")]
    Ingest(String),
}

/// Result type for allocator-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Observation field that failed to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Date,
    Price,
    Dividend,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Date => "date",
            Field::Price => "price",
            Field::Dividend => "dividend",
        })
    }
}

/// A single observation field that could not be normalized.
///
/// Parse errors are recovered where they occur: the builder drops or masks the
/// offending value and hands the error back so the caller can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("row {row}: cannot parse {field} from {text:?}")]
pub struct ParseError {
    /// Zero-based index of the record in the input order
    pub row: usize,
    /// Field that failed
    pub field: Field,
    /// Original text
    pub text: String,
}
