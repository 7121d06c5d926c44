//! Portfolio weight vectors and split-point weighting.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Allowed deviation of the weight sum from 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weight of one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetWeight {
    pub asset: String,
    pub weight: f64,
}

/// Non-negative asset weights summing to 1.
///
/// Invalid weights are rejected, never renormalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightVector {
    entries: Vec<AssetWeight>,
}

impl WeightVector {
    /// Create a weight vector, validating the sum and every weight.
    ///
    /// ```rust
    /// use allocator_core::portfolio::WeightVector;
    ///
    /// let weights = WeightVector::new([("TLT", 0.33), ("SHY", 0.33), ("SPY", 0.34)]).unwrap();
    /// assert_eq!(weights.weight("SPY"), Some(0.34));
    ///
    /// assert!(WeightVector::new([("TLT", 0.5), ("SPY", 0.6)]).is_err());
    /// ```
    pub fn new<I, S>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries = weights
            .into_iter()
            .map(|(asset, weight)| AssetWeight {
                asset: asset.into(),
                weight,
            })
            .collect();
        let vector = Self { entries };
        vector.validate()?;
        Ok(vector)
    }

    /// Equal weights `1/N` over the given assets.
    pub fn equal<I, S>(assets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets: Vec<String> = assets.into_iter().map(Into::into).collect();
        let weight = 1.0 / assets.len() as f64;
        Self::new(assets.into_iter().map(|a| (a, weight)))
    }

    /// Check the sum, sign and uniqueness invariants.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::Configuration("weight vector is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.asset.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate weight for {}",
                    entry.asset
                )));
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(Error::Configuration(format!(
                    "weight for {} must be a non-negative number, got {}",
                    entry.asset, entry.weight
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::Configuration(format!(
                "weights must sum to 1, got {sum:.6}"
            )));
        }
        Ok(())
    }

    /// Weight of one asset.
    pub fn weight(&self, asset: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.asset == asset)
            .map(|e| e.weight)
    }

    pub fn entries(&self) -> &[AssetWeight] {
        &self.entries
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.asset.as_str())
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weights ordered like `assets`.
    ///
    /// Fails unless the weight key set equals the asset set exactly.
    pub fn for_assets(&self, assets: &[String]) -> Result<Vec<f64>> {
        self.validate()?;

        if let Some(extra) = self
            .assets()
            .find(|&a| !assets.iter().any(|b| b.as_str() == a))
        {
            return Err(Error::Configuration(format!(
                "weight given for unknown asset {extra}"
            )));
        }

        assets
            .iter()
            .map(|asset| {
                self.weight(asset).ok_or_else(|| {
                    Error::Configuration(format!("no weight given for asset {asset}"))
                })
            })
            .collect()
    }
}

/// Two ordered cut points on `[0, 1]` defining three contiguous weights.
///
/// `w1 = first`, `w2 = second - first`, `w3 = 1 - second`. The sum is 1 by
/// construction; ordering has to be checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitPoints {
    pub first: f64,
    pub second: f64,
}

impl SplitPoints {
    pub fn new(first: f64, second: f64) -> Self {
        Self { first, second }
    }

    /// The three segment lengths, unchecked.
    pub fn segments(&self) -> [f64; 3] {
        [
            self.first,
            self.second - self.first,
            1.0 - self.second,
        ]
    }

    /// Segment lengths, failing when any is negative or not finite.
    pub fn validated_segments(&self) -> Result<[f64; 3]> {
        let segments = self.segments();
        if segments.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Configuration(format!(
                "split points must satisfy 0 <= {} <= {} <= 1",
                self.first, self.second
            )));
        }
        Ok(segments)
    }

    /// Weight vector over three assets, in segment order.
    pub fn to_weights<S: Into<String>>(&self, assets: [S; 3]) -> Result<WeightVector> {
        let segments = self.validated_segments()?;
        WeightVector::new(assets.into_iter().zip(segments))
    }
}
