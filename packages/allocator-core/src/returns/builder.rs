//! Lag-1 total-return construction for a single asset.

use super::normalize::{parse_date, parse_dividend, parse_price};
use crate::types::{AssetReturnSeries, Observation, RawObservation, ReturnPoint};
use crate::{Field, ParseError};
use serde::Serialize;
use tracing::debug;

/// Result of building one asset's return series from raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutcome {
    /// The return series
    pub series: AssetReturnSeries,
    /// Fields that failed normalization, in input order
    pub rejected: Vec<ParseError>,
}

/// Normalize raw observations.
///
/// Records with an unparsable date are dropped. An unparsable price keeps the
/// record with a NaN price, and an unparsable dividend falls back to zero.
/// Every failure is reported in the returned error list.
pub fn parse_observations(raw: &[RawObservation]) -> (Vec<Observation>, Vec<ParseError>) {
    let mut observations = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (row, record) in raw.iter().enumerate() {
        let Some(date) = parse_date(&record.date) else {
            rejected.push(ParseError {
                row,
                field: Field::Date,
                text: record.date.clone(),
            });
            continue;
        };

        let price = parse_price(&record.price).unwrap_or_else(|| {
            rejected.push(ParseError {
                row,
                field: Field::Price,
                text: record.price.clone(),
            });
            f64::NAN
        });

        let dividend = parse_dividend(record.dividend.as_deref()).unwrap_or_else(|| {
            rejected.push(ParseError {
                row,
                field: Field::Dividend,
                text: record.dividend.clone().unwrap_or_default(),
            });
            0.0
        });

        observations.push(Observation::new(date, price).with_dividend(dividend));
    }

    (observations, rejected)
}

/// Build a return series from parsed observations.
///
/// Observations are stably sorted by date when out of order; for duplicate
/// dates the last one supplied wins. `return[i] = (price[i] + dividend[i]) /
/// price[i-1] - 1`. The first observation, any observation without a usable
/// price and the observation right after it produce no return.
pub fn build_from_observations(
    asset: impl Into<String>,
    mut observations: Vec<Observation>,
) -> AssetReturnSeries {
    let asset = asset.into();
    if !observations.windows(2).all(|w| w[0].date <= w[1].date) {
        debug!(asset = %asset, "sorting observations by date");
        observations.sort_by_key(|o| o.date);
    }
    let supplied = observations.len();

    let mut unique: Vec<Observation> = Vec::with_capacity(observations.len());
    for observation in observations {
        match unique.last_mut() {
            Some(last) if last.date == observation.date => *last = observation,
            _ => unique.push(observation),
        }
    }
    if unique.len() < supplied {
        debug!(
            asset = %asset,
            duplicates = supplied - unique.len(),
            "kept the last observation for duplicate dates"
        );
    }

    let points = unique
        .windows(2)
        .filter_map(|w| {
            let (prev, curr) = (&w[0], &w[1]);
            if !prev.has_price() || !curr.has_price() {
                return None;
            }
            let value = (curr.price + curr.dividend) / prev.price - 1.0;
            value.is_finite().then_some(ReturnPoint::new(curr.date, value))
        })
        .collect();

    AssetReturnSeries::from_sorted(asset, points)
}

/// Build an asset's return series from loader-supplied text.
pub fn build(asset: impl Into<String>, raw: &[RawObservation]) -> BuildOutcome {
    let (observations, rejected) = parse_observations(raw);
    BuildOutcome {
        series: build_from_observations(asset, observations),
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_total_return_includes_dividend() {
        let outcome = build(
            "TLT",
            &[
                RawObservation::new("2024-01-02", "100"),
                RawObservation::new("2024-01-03", "101").with_dividend("1"),
                RawObservation::new("2024-01-04", "99.99"),
            ],
        );

        assert!(outcome.rejected.is_empty());
        let series = outcome.series;
        assert_eq!(series.asset(), "TLT");
        assert_eq!(series.len(), 2);
        // (101 + 1) / 100 - 1 = 2%
        assert_relative_eq!(series.points()[0].value, 0.02, epsilon = 1e-12);
        // 99.99 / 101 - 1
        assert_relative_eq!(series.points()[1].value, 99.99 / 101.0 - 1.0, epsilon = 1e-12);
        assert_eq!(series.points()[0].date, d(2024, 1, 3));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let outcome = build(
            "SPY",
            &[
                RawObservation::new("2024-01-04", "110"),
                RawObservation::new("2024-01-02", "100"),
                RawObservation::new("2024-01-03", "105"),
            ],
        );

        let dates: Vec<_> = outcome.series.dates().collect();
        assert_eq!(dates, vec![d(2024, 1, 3), d(2024, 1, 4)]);
        assert_relative_eq!(outcome.series.points()[0].value, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let outcome = build(
            "SPY",
            &[
                RawObservation::new("2024-01-02", "100"),
                RawObservation::new("2024-01-03", "999"),
                RawObservation::new("2024-01-03", "102"),
            ],
        );

        assert_eq!(outcome.series.len(), 1);
        assert_relative_eq!(outcome.series.points()[0].value, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_unparsable_price_removes_own_and_next_return() {
        let outcome = build(
            "SHY",
            &[
                RawObservation::new("2024-01-02", "100"),
                RawObservation::new("2024-01-03", "101"),
                RawObservation::new("2024-01-04", "--"),
                RawObservation::new("2024-01-05", "102"),
                RawObservation::new("2024-01-08", "103"),
            ],
        );

        let dates: Vec<_> = outcome.series.dates().collect();
        assert_eq!(dates, vec![d(2024, 1, 3), d(2024, 1, 8)]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].row, 2);
        assert_eq!(outcome.rejected[0].field, Field::Price);
    }

    #[test]
    fn test_unparsable_first_price_skips_day_two() {
        let outcome = build(
            "SHY",
            &[
                RawObservation::new("2024-01-02", "bad"),
                RawObservation::new("2024-01-03", "100"),
                RawObservation::new("2024-01-04", "101"),
            ],
        );

        let dates: Vec<_> = outcome.series.dates().collect();
        assert_eq!(dates, vec![d(2024, 1, 4)]);
    }

    #[test]
    fn test_zero_prior_price_excluded() {
        let outcome = build(
            "X",
            &[
                RawObservation::new("2024-01-02", "0"),
                RawObservation::new("2024-01-03", "10"),
                RawObservation::new("2024-01-04", "0"),
            ],
        );

        // 10 / 0 is infinite; 0 / 10 - 1 = -100% is a valid return
        assert_eq!(outcome.series.len(), 1);
        assert_relative_eq!(outcome.series.points()[0].value, -1.0);
    }

    #[test]
    fn test_bad_dividend_defaults_to_zero() {
        let outcome = build(
            "SPY",
            &[
                RawObservation::new("2024-01-02", "100"),
                RawObservation::new("2024-01-03", "101").with_dividend("n/a"),
            ],
        );

        assert_eq!(outcome.series.len(), 1);
        assert_relative_eq!(outcome.series.points()[0].value, 0.01, epsilon = 1e-12);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].field, Field::Dividend);
    }

    #[test]
    fn test_bad_date_drops_record() {
        let outcome = build(
            "SPY",
            &[
                RawObservation::new("2024-01-02", "100"),
                RawObservation::new("not a date", "500"),
                RawObservation::new("2024-01-03", "101"),
            ],
        );

        assert_eq!(outcome.series.len(), 1);
        assert_relative_eq!(outcome.series.points()[0].value, 0.01, epsilon = 1e-12);
        assert_eq!(outcome.rejected[0].field, Field::Date);
    }

    #[test]
    fn test_mixed_encodings() {
        let outcome = build(
            "SPY",
            &[
                RawObservation::new("'2024年1月2日'", "'1,000'"),
                RawObservation::new("2024/01/03", "\"1,010\""),
            ],
        );

        assert!(outcome.rejected.is_empty());
        assert_relative_eq!(outcome.series.points()[0].value, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let outcome = build("EMPTY", &[]);
        assert!(outcome.series.is_empty());
        assert!(outcome.rejected.is_empty());

        let single = build("ONE", &[RawObservation::new("2024-01-02", "100")]);
        assert!(single.series.is_empty());
    }
}
