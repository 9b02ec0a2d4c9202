//! Training run configuration.
//!
//! Settings come from an optional TOML file; every field has a default so an
//! empty or missing file reproduces the stock training run.

mod defaults;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::forest::ForestOptions;

pub use defaults::{
    DEFAULT_CONFIG_FILE, DEFAULT_EXERCISES_CSV, DEFAULT_MEMBERS_CSV, DEFAULT_MODEL_PATH,
};
use defaults::*;

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("Invalid setting `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Full configuration for one training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Input and output file locations.
    #[serde(default)]
    pub paths: PathSettings,
    /// Column roles in the member records.
    #[serde(default)]
    pub columns: ColumnSettings,
    /// Holdout split parameters.
    #[serde(default)]
    pub split: SplitSettings,
    /// Random forest hyperparameters.
    #[serde(default)]
    pub forest: ForestSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_members_csv")]
    pub members_csv: PathBuf,
    /// Loaded and summarized, not used as model input.
    #[serde(default = "default_exercises_csv")]
    pub exercises_csv: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_out: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSettings {
    #[serde(default = "default_numeric_columns")]
    pub numeric: Vec<String>,
    #[serde(default = "default_categorical_columns")]
    pub categorical: Vec<String>,
    #[serde(default = "default_target_column")]
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Fraction of rows held out for evaluation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSettings {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Unlimited when absent.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            members_csv: default_members_csv(),
            exercises_csv: default_exercises_csv(),
            model_out: default_model_path(),
        }
    }
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            numeric: default_numeric_columns(),
            categorical: default_categorical_columns(),
            target: default_target_column(),
        }
    }
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            seed: default_seed(),
            max_depth: None,
        }
    }
}

impl ForestSettings {
    pub fn forest_options(&self) -> ForestOptions {
        ForestOptions {
            n_estimators: self.n_estimators,
            seed: self.seed,
            max_depth: self.max_depth,
        }
    }
}

impl TrainingConfig {
    /// Load a config file, falling back to defaults for missing fields.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, else `workout_model.toml` from the working
    /// directory when it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            tracing::info!("Using config file {}", local.display());
            return Self::load_from(local);
        }
        Ok(Self::default())
    }

    /// Reject settings the training run cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.split.test_fraction;
        if !(fraction.is_finite() && fraction > 0.0 && fraction < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "split.test_fraction",
                reason: format!("{fraction} is not in (0, 1)"),
            });
        }
        if self.forest.n_estimators == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forest.n_estimators",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.forest.max_depth == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "forest.max_depth",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        if self.columns.numeric.is_empty() && self.columns.categorical.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "columns",
                reason: "no feature columns declared".to_string(),
            });
        }
        if self.columns.target.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "columns.target",
                reason: "target column name is empty".to_string(),
            });
        }
        Ok(())
    }
}
