//! Pipeline configuration

use crate::error::{MaintenanceError, Result};
use crate::preprocessing::ScalerType;
use crate::synthetic::BalanceMethod;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feature standardization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub enabled: bool,
    pub scaler: ScalerType,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scaler: ScalerType::Standard,
        }
    }
}

/// Class balancing settings, applied to the training partition only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancingConfig {
    pub enabled: bool,
    pub method: BalanceMethod,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            method: BalanceMethod::default(),
        }
    }
}

/// Train/test split settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing, in (0, 1)
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Configuration for [`run_pipeline`](super::run_pipeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column holding the failure label
    pub target_col: String,

    /// Target value mapped to 0; every other value maps to 1
    pub negative_label: String,

    /// Identifier columns removed before training
    pub drop_cols: Vec<String>,

    /// Columns one-hot encoded after the split
    pub categorical_cols: Vec<String>,

    pub scaling: ScalingConfig,
    pub balancing: BalancingConfig,
    pub split: SplitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_col: "Failure Type".to_string(),
            negative_label: "No Failure".to_string(),
            drop_cols: vec!["UDI".to_string(), "Product ID".to_string()],
            categorical_cols: vec!["Type".to_string()],
            scaling: ScalingConfig::default(),
            balancing: BalancingConfig::default(),
            split: SplitConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Fields missing from the file keep their default values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            MaintenanceError::ConfigError(format!("{}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check values that would otherwise fail deep inside a pipeline stage
    pub fn validate(&self) -> Result<()> {
        if self.target_col.is_empty() {
            return Err(MaintenanceError::ConfigError(
                "target_col must not be empty".to_string(),
            ));
        }
        if !(self.split.test_size > 0.0 && self.split.test_size < 1.0) {
            return Err(MaintenanceError::ConfigError(format!(
                "split.test_size must be in (0, 1), got {}",
                self.split.test_size
            )));
        }
        Ok(())
    }

    /// Builder method to set the target column
    pub fn with_target_col(mut self, target_col: impl Into<String>) -> Self {
        self.target_col = target_col.into();
        self
    }

    /// Builder method to set the label mapped to 0
    pub fn with_negative_label(mut self, label: impl Into<String>) -> Self {
        self.negative_label = label.into();
        self
    }

    /// Builder method to set the identifier columns to drop
    pub fn with_drop_cols<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.drop_cols = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the categorical columns
    pub fn with_categorical_cols<S: Into<String>>(
        mut self,
        cols: impl IntoIterator<Item = S>,
    ) -> Self {
        self.categorical_cols = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to enable/disable scaling
    pub fn with_scaling(mut self, enabled: bool) -> Self {
        self.scaling.enabled = enabled;
        self
    }

    /// Builder method to set the scaler
    pub fn with_scaler(mut self, scaler: ScalerType) -> Self {
        self.scaling.scaler = scaler;
        self
    }

    /// Builder method to enable/disable balancing
    pub fn with_balancing(mut self, enabled: bool) -> Self {
        self.balancing.enabled = enabled;
        self
    }

    /// Builder method to set the balancing method
    pub fn with_balance_method(mut self, method: BalanceMethod) -> Self {
        self.balancing.method = method;
        self
    }

    /// Builder method to set the split parameters
    pub fn with_split(mut self, test_size: f64, seed: u64) -> Self {
        self.split = SplitConfig { test_size, seed };
        self
    }
}
