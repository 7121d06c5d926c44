//! End-to-end analysis: align, weight, window, summarize.

use crate::config::AnalysisConfig;
use crate::portfolio::{
    aggregate, align, filter_window, summarize, year_buckets, AlignmentPolicy, WeightVector,
};
use crate::types::{
    AssetReturnSeries, DateWindow, PerformanceSummary, PortfolioReturnSeries, ReturnPoint,
    YearBucketSummary,
};
use crate::{Error, Result};
use serde::Serialize;
use tracing::debug;

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Alignment policy the panel was built with
    pub alignment: AlignmentPolicy,
    /// Assets in panel column order
    pub assets: Vec<String>,
    /// Rows in the aligned panel, before windowing
    pub panel_rows: usize,
    /// Tail-trim rows whose dates disagree across assets
    pub misaligned_rows: usize,
    pub weights: WeightVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    /// Portfolio returns, windowed if a window was configured
    pub series: PortfolioReturnSeries,
    /// Compounded cumulative return, rebased at the series' first date
    pub cumulative: Vec<ReturnPoint>,
    pub summary: PerformanceSummary,
    pub years: Vec<YearBucketSummary>,
}

/// Run the full pipeline over already-built asset series.
///
/// Weights must be configured explicitly; see
/// [`AnalysisConfig::resolve_weights`].
pub fn analyze(assets: &[AssetReturnSeries], config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    let panel = align(assets, config.alignment)?;
    debug!(
        policy = ?panel.policy(),
        assets = panel.assets().len(),
        rows = panel.len(),
        "aligned panel"
    );
    if panel.is_empty() {
        return Err(Error::NoData(
            "aligned panel has no rows shared by every asset".to_string(),
        ));
    }

    let weights = config.resolve_weights(panel.assets())?;
    let full = aggregate(&panel, &weights)?;

    let series = match &config.window {
        Some(window) => {
            let filtered = filter_window(&full, window.start, window.end)?;
            debug!(
                start = %window.start,
                end = %window.end,
                rows = filtered.len(),
                "applied date window"
            );
            filtered
        }
        None => full,
    };

    let options = match config.window {
        Some(_) => config.summary_options().for_window(),
        None => config.summary_options(),
    };
    let summary = summarize(&series, &options);
    let years = year_buckets(&series, options.annualization_periods);
    debug!(
        observations = summary.observations,
        years = years.len(),
        "summarized portfolio"
    );

    let cumulative = series
        .dates()
        .into_iter()
        .zip(summary.cumulative_return.iter())
        .map(|(date, &value)| ReturnPoint::new(date, value))
        .collect();

    Ok(AnalysisReport {
        alignment: panel.policy(),
        assets: panel.assets().to_vec(),
        panel_rows: panel.len(),
        misaligned_rows: panel.misaligned_rows(),
        weights,
        window: config.window,
        series,
        cumulative,
        summary,
        years,
    })
}
