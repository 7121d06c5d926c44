//! Two-asset allocation grid.

use super::aggregate::aggregate;
use super::align::AlignedPanel;
use super::performance::{summarize, SummaryOptions};
use super::weights::WeightVector;
use crate::types::PerformanceSummary;
use crate::{Error, Result};
use serde::Serialize;

/// Smallest accepted weight increment (1001 grid points).
pub const MIN_SWEEP_STEP: f64 = 0.001;

/// Summary of one grid allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub weights: WeightVector,
    pub summary: PerformanceSummary,
}

/// Summaries for first-asset weights `0, step, 2*step, ..., 1`.
///
/// The second asset takes the complement. The last grid point is clamped to
/// exactly 1. Every point is reported; none is selected.
pub fn allocation_sweep(
    panel: &AlignedPanel,
    step: f64,
    options: &SummaryOptions,
) -> Result<Vec<SweepPoint>> {
    let [first, second] = panel.assets() else {
        return Err(Error::Configuration(format!(
            "allocation sweep needs exactly 2 assets, got {}",
            panel.assets().len()
        )));
    };
    if !(MIN_SWEEP_STEP..=1.0).contains(&step) {
        return Err(Error::Configuration(format!(
            "sweep step must be in [{MIN_SWEEP_STEP}, 1], got {step}"
        )));
    }

    // Round so 0.1 steps land on 11 points despite binary fractions.
    let intervals = (1.0 / step - 1e-9).ceil() as usize;

    (0..=intervals)
        .map(|i| {
            let w = if i == intervals {
                1.0
            } else {
                (i as f64 * step).min(1.0)
            };
            let weights = WeightVector::new([(first.as_str(), w), (second.as_str(), 1.0 - w)])?;
            let series = aggregate(panel, &weights)?;
            Ok(SweepPoint {
                summary: summarize(&series, options),
                weights,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::align::align_by_date;
    use crate::types::{AssetReturnSeries, ReturnPoint};
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};

    fn series(asset: &str, values: &[f64]) -> AssetReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ReturnPoint::new(start + Duration::days(i as i64), v))
            .collect();
        AssetReturnSeries::from_points(asset, points).unwrap()
    }

    fn panel() -> AlignedPanel {
        align_by_date(&[
            series("STOCKS", &[0.02, -0.01, 0.015, -0.005]),
            series("BONDS", &[0.001, 0.002, 0.0, 0.001]),
        ])
        .unwrap()
    }

    #[test]
    fn test_tenth_steps() {
        let points = allocation_sweep(&panel(), 0.1, &SummaryOptions::default()).unwrap();

        assert_eq!(points.len(), 11);
        assert_eq!(points[0].weights.weight("STOCKS"), Some(0.0));
        assert_eq!(points[10].weights.weight("STOCKS"), Some(1.0));
        assert_abs_diff_eq!(points[3].weights.weight("BONDS").unwrap(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_endpoints_match_single_assets() {
        let panel = panel();
        let points = allocation_sweep(&panel, 0.5, &SummaryOptions::default()).unwrap();

        assert_eq!(points.len(), 3);
        let bonds_only = panel.column("BONDS").unwrap();
        let expected = bonds_only.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;
        assert_abs_diff_eq!(points[0].summary.total_return.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_uneven_step_clamps_last_point() {
        let points = allocation_sweep(&panel(), 0.3, &SummaryOptions::default()).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[4].weights.weight("STOCKS"), Some(1.0));
    }

    #[test]
    fn test_tiny_steps_are_rejected() {
        let options = SummaryOptions::default();
        for step in [1e-12, 1e-300, 0.0009] {
            assert!(matches!(
                allocation_sweep(&panel(), step, &options),
                Err(Error::Configuration(_))
            ));
        }

        let finest = allocation_sweep(&panel(), MIN_SWEEP_STEP, &options).unwrap();
        assert_eq!(finest.len(), 1001);
        assert_eq!(finest[1000].weights.weight("STOCKS"), Some(1.0));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let options = SummaryOptions::default();
        assert!(allocation_sweep(&panel(), 0.0, &options).is_err());
        assert!(allocation_sweep(&panel(), 1.5, &options).is_err());
        assert!(allocation_sweep(&panel(), f64::NAN, &options).is_err());

        let three = align_by_date(&[
            series("A", &[0.01]),
            series("B", &[0.01]),
            series("C", &[0.01]),
        ])
        .unwrap();
        assert!(matches!(
            allocation_sweep(&three, 0.1, &options),
            Err(Error::Configuration(_))
        ));
    }
}
