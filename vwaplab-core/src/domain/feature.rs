//! Feature columns — which bar fields feed the scheduler's input window.
//!
//! Feature selection shapes MODEL INPUT only. VWAP accounting (benchmark,
//! targets, execution prices) always reads `avg_price` and `volume` straight
//! from the bars, so feature engineering can evolve without touching the
//! money math.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::bar::Bar;

/// A bar column usable as scheduler input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AvgPrice,
    Volume,
}

impl Feature {
    /// Extract this feature's value from a bar.
    pub fn value(&self, bar: &Bar) -> f64 {
        match self {
            Feature::AvgPrice => bar.avg_price,
            Feature::Volume => bar.volume,
        }
    }

    /// Column name as it appears in bar files and configs.
    pub fn column_name(&self) -> &'static str {
        match self {
            Feature::AvgPrice => "avg_price",
            Feature::Volume => "volume",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Unrecognized feature name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown feature '{0}' (expected 'avg_price' or 'volume')")]
pub struct FeatureParseError(pub String);

impl FromStr for Feature {
    type Err = FeatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg_price" => Ok(Feature::AvgPrice),
            "volume" => Ok(Feature::Volume),
            other => Err(FeatureParseError(other.to_string())),
        }
    }
}

/// Build a dense `[len × n_features]` matrix from a bar slice.
///
/// Row i holds the selected feature values of `bars[i]`, in the order the
/// features were configured. Shared by the sequence builder (X windows) and
/// the simulator (per-step input windows).
pub fn feature_matrix(bars: &[Bar], features: &[Feature]) -> Array2<f64> {
    let mut out = Array2::zeros((bars.len(), features.len()));
    for (i, bar) in bars.iter().enumerate() {
        for (j, feature) in features.iter().enumerate() {
            out[[i, j]] = feature.value(bar);
        }
    }
    out
}
