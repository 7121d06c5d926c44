//! Weighted aggregation of an aligned panel into one portfolio series.

use super::align::AlignedPanel;
use super::weights::WeightVector;
use crate::types::{PortfolioReturnSeries, ReturnPoint};
use crate::Result;

/// Portfolio return on each panel row: the inner product of the weights and
/// the row's asset returns.
///
/// Fails with a configuration error when the weights are invalid or their
/// asset set differs from the panel's. The output has one point per row.
pub fn aggregate(panel: &AlignedPanel, weights: &WeightVector) -> Result<PortfolioReturnSeries> {
    let ordered = weights.for_assets(panel.assets())?;

    let points = panel
        .dates()
        .iter()
        .enumerate()
        .map(|(row, &date)| {
            let value = panel
                .columns()
                .iter()
                .zip(&ordered)
                .map(|(column, weight)| weight * column[row])
                .sum();
            ReturnPoint::new(date, value)
        })
        .collect();

    Ok(PortfolioReturnSeries::from_sorted(points))
}
