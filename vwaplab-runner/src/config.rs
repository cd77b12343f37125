//! Serializable run configuration.
//!
//! One TOML file drives a whole run: data source, window geometry, feature
//! selection, execution size, training hyperparameters, and the train/test
//! split. Every section has classic defaults, so a minimal config is valid;
//! structural validation happens once at load time, before any per-session
//! processing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use vwaplab_core::domain::Feature;
use vwaplab_core::window::{WindowConfig, WindowError};

/// Unique identifier for a run (content-addressable hash of the config).
pub type RunId = String;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error("features must not be empty")]
    NoFeatures,

    #[error("total_shares must be positive, got {0}")]
    NonPositiveShares(f64),

    #[error("epochs must be positive")]
    ZeroEpochs,

    #[error("batch_size must be positive")]
    ZeroBatchSize,

    #[error("learning_rate must be positive, got {0}")]
    NonPositiveLearningRate(f64),

    #[error("validation_split must be in [0, 1), got {0}")]
    InvalidValidationSplit(f64),

    #[error("test_fraction must be in (0, 1), got {0}")]
    InvalidTestFraction(f64),

    #[error("data path is required unless running with synthetic data")]
    MissingDataPath,
}

/// Full run configuration, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub data: DataConfig,
    pub schedule: ScheduleConfig,
    pub execution: ExecutionConfig,
    pub training: TrainingConfig,
    pub split: SplitConfig,
}

/// Where the minute bars come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Bar CSV path; optional because synthetic runs need no file.
    pub path: Option<PathBuf>,
}

/// Window geometry and feature selection for the scheduler input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub lookback: usize,
    pub horizon: usize,
    pub features: Vec<Feature>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            lookback: 120,
            horizon: 30,
            features: vec![Feature::AvgPrice, Feature::Volume],
        }
    }
}

/// Order sizing at execution time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    pub total_shares: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            total_shares: 1_000_000.0,
        }
    }
}

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Chronological tail of the training pairs held out per epoch.
    pub validation_split: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 20,
            batch_size: 64,
            learning_rate: 0.001,
            validation_split: 0.2,
            seed: 42,
        }
    }
}

/// Train/test split over sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    /// Chronological tail of SESSIONS reserved for the backtest.
    pub test_fraction: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig { test_fraction: 0.2 }
    }
}

impl RunConfig {
    /// Read and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation; all failures are fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        WindowConfig::new(self.schedule.lookback, self.schedule.horizon)?;
        if self.schedule.features.is_empty() {
            return Err(ConfigError::NoFeatures);
        }
        let shares = self.execution.total_shares;
        if !(shares.is_finite() && shares > 0.0) {
            return Err(ConfigError::NonPositiveShares(shares));
        }
        if self.training.epochs == 0 {
            return Err(ConfigError::ZeroEpochs);
        }
        if self.training.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        let lr = self.training.learning_rate;
        if !(lr.is_finite() && lr > 0.0) {
            return Err(ConfigError::NonPositiveLearningRate(lr));
        }
        let vs = self.training.validation_split;
        if !(0.0..1.0).contains(&vs) {
            return Err(ConfigError::InvalidValidationSplit(vs));
        }
        let tf = self.split.test_fraction;
        if !(tf > 0.0 && tf < 1.0) {
            return Err(ConfigError::InvalidTestFraction(tf));
        }
        Ok(())
    }

    /// The validated window geometry.
    pub fn window(&self) -> Result<WindowConfig, ConfigError> {
        Ok(WindowConfig::new(
            self.schedule.lookback,
            self.schedule.horizon,
        )?)
    }

    /// The bar file path, required for non-synthetic runs.
    pub fn data_path(&self) -> Result<&Path, ConfigError> {
        self.data
            .path
            .as_deref()
            .ok_or(ConfigError::MissingDataPath)
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, so artifacts from a
    /// re-run land in the same directory.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
