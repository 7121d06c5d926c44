//! Alignment of per-asset return series onto a shared axis.

use crate::types::AssetReturnSeries;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How per-asset series are paired row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentPolicy {
    /// Keep only dates present in every series.
    #[default]
    DateIntersection,
    /// Keep the last K returns of each series, K = shortest length.
    /// Dates are not checked; use only when no shared date key exists.
    TailTrim,
}

/// Per-asset returns on one shared row axis.
///
/// Columns are in the order the assets were supplied and all have the same
/// length as `dates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPanel {
    policy: AlignmentPolicy,
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
    misaligned_rows: usize,
}

impl AlignedPanel {
    /// Policy that produced this panel.
    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Row dates. For tail-trim panels these are the first asset's dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Returns for one asset, if present.
    pub fn column(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Returns of every asset on row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<f64>> {
        if idx >= self.dates.len() {
            return None;
        }
        Some(self.columns.iter().map(|col| col[idx]).collect())
    }

    /// Rows whose underlying dates differ between assets (tail-trim only).
    pub fn misaligned_rows(&self) -> usize {
        self.misaligned_rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

fn check_inputs(series: &[AssetReturnSeries]) -> Result<()> {
    if series.is_empty() {
        return Err(Error::NoData("no asset series supplied".to_string()));
    }
    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.asset()) {
            return Err(Error::Configuration(format!(
                "asset supplied more than once: {}",
                s.asset()
            )));
        }
    }
    Ok(())
}

/// Align series on the dates present in every one of them, ascending.
///
/// No common date yields an empty panel, not an error.
pub fn align_by_date(series: &[AssetReturnSeries]) -> Result<AlignedPanel> {
    check_inputs(series)?;

    let mut common: BTreeSet<NaiveDate> = series[0].dates().collect();
    for s in &series[1..] {
        let dates: HashSet<NaiveDate> = s.dates().collect();
        common.retain(|d| dates.contains(d));
    }

    let columns = series
        .iter()
        .map(|s| {
            s.points()
                .iter()
                .filter(|p| common.contains(&p.date))
                .map(|p| p.value)
                .collect()
        })
        .collect();

    tracing::debug!(
        assets = series.len(),
        rows = common.len(),
        "aligned return series by date intersection"
    );

    Ok(AlignedPanel {
        policy: AlignmentPolicy::DateIntersection,
        assets: series.iter().map(|s| s.asset().to_string()).collect(),
        dates: common.into_iter().collect(),
        columns,
        misaligned_rows: 0,
    })
}

/// Align series by taking the last K returns of each, K = shortest length.
///
/// Rows are paired by position, so assets with different trading calendars
/// end up side by side on different dates. The count of such rows is kept in
/// [`AlignedPanel::misaligned_rows`].
pub fn align_by_tail(series: &[AssetReturnSeries]) -> Result<AlignedPanel> {
    check_inputs(series)?;

    let k = series.iter().map(|s| s.len()).min().unwrap_or(0);
    let tails: Vec<_> = series.iter().map(|s| &s.points()[s.len() - k..]).collect();

    let dates: Vec<NaiveDate> = tails[0].iter().map(|p| p.date).collect();
    let columns = tails
        .iter()
        .map(|tail| tail.iter().map(|p| p.value).collect())
        .collect();

    let misaligned_rows = (0..k)
        .filter(|&i| tails.iter().any(|tail| tail[i].date != dates[i]))
        .count();

    if misaligned_rows > 0 {
        tracing::warn!(
            misaligned_rows,
            rows = k,
            "tail-trim alignment paired returns from different dates"
        );
    } else {
        tracing::debug!(assets = series.len(), rows = k, "aligned return series by tail");
    }

    Ok(AlignedPanel {
        policy: AlignmentPolicy::TailTrim,
        assets: series.iter().map(|s| s.asset().to_string()).collect(),
        dates,
        columns,
        misaligned_rows,
    })
}

/// Align series with the given policy.
pub fn align(series: &[AssetReturnSeries], policy: AlignmentPolicy) -> Result<AlignedPanel> {
    match policy {
        AlignmentPolicy::DateIntersection => align_by_date(series),
        AlignmentPolicy::TailTrim => align_by_tail(series),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReturnPoint;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(asset: &str, points: &[(u32, f64)]) -> AssetReturnSeries {
        AssetReturnSeries::from_points(
            asset,
            points
                .iter()
                .map(|&(day, value)| ReturnPoint::new(d(day), value))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_intersection_keeps_common_dates() {
        let a = series("A", &[(1, 0.01), (2, 0.02), (3, 0.03)]);
        let b = series("B", &[(2, -0.01), (3, -0.02), (4, -0.03)]);

        let panel = align_by_date(&[a, b]).unwrap();

        assert_eq!(panel.policy(), AlignmentPolicy::DateIntersection);
        assert_eq!(panel.dates(), &[d(2), d(3)]);
        assert_eq!(panel.column("A").unwrap(), &[0.02, 0.03]);
        assert_eq!(panel.column("B").unwrap(), &[-0.01, -0.02]);
        assert_eq!(panel.row(1), Some(vec![0.03, -0.02]));
        assert_eq!(panel.misaligned_rows(), 0);
    }

    #[test]
    fn test_intersection_with_gaps() {
        let a = series("A", &[(1, 0.01), (3, 0.03), (5, 0.05), (8, 0.08)]);
        let b = series("B", &[(1, 0.1), (2, 0.2), (5, 0.5), (8, 0.8)]);
        let c = series("C", &[(1, 1.0), (5, 5.0), (9, 9.0)]);

        let panel = align_by_date(&[a, b, c]).unwrap();

        assert_eq!(panel.dates(), &[d(1), d(5)]);
        assert_eq!(panel.assets(), &["A", "B", "C"]);
        assert_eq!(panel.columns()[2], vec![1.0, 5.0]);
    }

    #[test]
    fn test_intersection_without_overlap_is_empty() {
        let a = series("A", &[(1, 0.01), (2, 0.02)]);
        let b = series("B", &[(3, 0.03), (4, 0.04)]);

        let panel = align_by_date(&[a, b]).unwrap();

        assert!(panel.is_empty());
        assert_eq!(panel.columns().len(), 2);
        assert!(panel.columns().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_tail_trim_uses_shortest_length() {
        let a = series("A", &[(1, 0.01), (2, 0.02), (3, 0.03), (4, 0.04)]);
        let b = series("B", &[(3, 0.3), (4, 0.4)]);

        let panel = align_by_tail(&[a, b]).unwrap();

        assert_eq!(panel.policy(), AlignmentPolicy::TailTrim);
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.column("A").unwrap(), &[0.03, 0.04]);
        assert_eq!(panel.dates(), &[d(3), d(4)]);
        assert_eq!(panel.misaligned_rows(), 0);
    }

    #[test]
    fn test_tail_trim_counts_misaligned_rows() {
        // B skips the 3rd (holiday) and trades on the 5th instead.
        let a = series("A", &[(1, 0.01), (2, 0.02), (3, 0.03), (4, 0.04)]);
        let b = series("B", &[(1, 0.1), (2, 0.2), (4, 0.4), (5, 0.5)]);

        let panel = align(&[a, b], AlignmentPolicy::TailTrim).unwrap();

        assert_eq!(panel.len(), 4);
        assert_eq!(panel.dates(), &[d(1), d(2), d(3), d(4)]);
        assert_eq!(panel.misaligned_rows(), 2);
    }

    #[test]
    fn test_tail_trim_with_empty_series() {
        let a = series("A", &[(1, 0.01)]);
        let b = series("B", &[]);

        let panel = align_by_tail(&[a, b]).unwrap();
        assert!(panel.is_empty());
    }

    #[test]
    fn test_no_series_is_no_data() {
        assert!(matches!(align_by_date(&[]), Err(Error::NoData(_))));
        assert!(matches!(align_by_tail(&[]), Err(Error::NoData(_))));
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let a = series("A", &[(1, 0.01)]);
        let result = align_by_date(&[a.clone(), a]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
