//! Analysis configuration and its TOML file.
//!
//! ```toml
//! annualization_periods = 252
//! risk_free_rate = 0.02
//! alignment = "date-intersection"
//!
//! [weights]
//! TLT = 0.33
//! SHY = 0.33
//! SPY = 0.34
//!
//! [window]
//! start = "2010-01-01"
//! end = "2020-12-31"
//! ```
//!
//! `split = { first = 0.33, second = 0.66 }` may replace `[weights]` for a
//! three-asset portfolio.

use crate::portfolio::{
    AlignmentPolicy, SplitPoints, SummaryOptions, WeightVector, TRADING_DAYS_PER_YEAR,
};
use crate::types::{AnnualizationMethod, DateWindow};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default config location.
pub const CONFIG_ENV_VAR: &str = "ALLOCATOR_CONFIG";

/// Everything the pipeline needs besides the asset series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Explicit weight per asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
    /// Split points for three assets, in supply order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitPoints>,
    /// Inclusive date window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    pub annualization_periods: u32,
    pub risk_free_rate: f64,
    pub annualization: AnnualizationMethod,
    pub alignment: AlignmentPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weights: None,
            split: None,
            window: None,
            annualization_periods: TRADING_DAYS_PER_YEAR,
            risk_free_rate: 0.0,
            annualization: AnnualizationMethod::Auto,
            alignment: AlignmentPolicy::DateIntersection,
        }
    }
}

impl AnalysisConfig {
    /// Get the default config file path.
    ///
    /// `$ALLOCATOR_CONFIG` if set, else `<config dir>/allocator/config.toml`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("allocator/config.toml"))
            .unwrap_or_else(|| PathBuf::from("allocator.toml"))
    }

    /// Load from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Check scalar settings and the window. Weights are checked against the
    /// asset set in [`AnalysisConfig::resolve_weights`].
    pub fn validate(&self) -> Result<()> {
        if self.annualization_periods == 0 {
            return Err(Error::Configuration(
                "annualization_periods must be positive".to_string(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(Error::Configuration("risk_free_rate must be finite".to_string()));
        }
        if self.weights.is_some() && self.split.is_some() {
            return Err(Error::Configuration(
                "configure either weights or split points, not both".to_string(),
            ));
        }
        if let Some(window) = &self.window {
            window.validate()?;
        }
        Ok(())
    }

    /// Weight vector for `assets` (in panel order).
    ///
    /// Never substitutes a default: with neither weights nor split points
    /// configured this is a configuration error.
    pub fn resolve_weights(&self, assets: &[String]) -> Result<WeightVector> {
        match (&self.weights, &self.split) {
            (Some(_), Some(_)) => Err(Error::Configuration(
                "configure either weights or split points, not both".to_string(),
            )),
            (Some(weights), None) => {
                WeightVector::new(weights.iter().map(|(asset, &w)| (asset.clone(), w)))
            }
            (None, Some(split)) => match assets {
                [a, b, c] => split.to_weights([a.clone(), b.clone(), c.clone()]),
                _ => Err(Error::Configuration(format!(
                    "split points need exactly 3 assets, got {}",
                    assets.len()
                ))),
            },
            (None, None) => Err(Error::Configuration("no weights configured".to_string())),
        }
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            annualization_periods: self.annualization_periods,
            risk_free_rate: self.risk_free_rate,
            method: self.annualization,
        }
    }
}
