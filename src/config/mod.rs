//! Scan Configuration Module
//!
//! Tunable pipeline parameters loaded from TOML, with defaults that
//! reproduce the fixed rule-layer contract exactly.
//!
//! ## Loading Order
//!
//! 1. `VIGIL_CONFIG` environment variable (path to TOML file)
//! 2. `vigil.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Partial files are fine: any omitted key takes its default.

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "VIGIL_CONFIG";

/// Default config file name in the working directory
pub const CONFIG_FILE: &str = "vigil.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Pipeline configuration for one scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Probability bound for critical alerts (strict `>`)
    pub critical_threshold: f64,
    /// Probability bound for Medium recommendations (strict `>`)
    pub medium_threshold: f64,
    /// Seed for the split and all classifier randomness. Varying this is
    /// the only source of run-to-run variation.
    pub seed: u64,
    /// Held-out fraction for evaluation
    pub test_fraction: f64,
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples to keep splitting
    pub min_samples_split: usize,
    /// Bootstrap sample ratio per tree
    pub sample_ratio: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            critical_threshold: defaults::CRITICAL_THRESHOLD,
            medium_threshold: defaults::MEDIUM_THRESHOLD,
            seed: defaults::DEFAULT_SEED,
            test_fraction: defaults::TEST_FRACTION,
            n_trees: defaults::N_TREES,
            max_depth: defaults::MAX_DEPTH,
            min_samples_split: defaults::MIN_SAMPLES_SPLIT,
            sample_ratio: defaults::SAMPLE_RATIO,
        }
    }
}

impl ScanConfig {
    /// Load following the documented order; falls back to defaults when no
    /// file is present.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("loading scan config from {CONFIG_ENV_VAR}={path}");
            return Self::from_file(Path::new(&path));
        }
        let cwd_file = Path::new(CONFIG_FILE);
        if cwd_file.exists() {
            info!("loading scan config from ./{CONFIG_FILE}");
            return Self::from_file(cwd_file);
        }
        Ok(Self::default())
    }

    /// Parse and validate a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the rule layer or the model
    /// nonsensical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.critical_threshold)
            || !(0.0..=1.0).contains(&self.medium_threshold)
        {
            return Err(ConfigError::Invalid(
                "thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if self.medium_threshold >= self.critical_threshold {
            return Err(ConfigError::Invalid(format!(
                "medium threshold ({}) must be below critical threshold ({})",
                self.medium_threshold, self.critical_threshold
            )));
        }
        if !(0.0..=0.5).contains(&self.test_fraction) {
            return Err(ConfigError::Invalid(
                "test fraction must lie in [0, 0.5]".to_string(),
            ));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::Invalid("n_trees must be >= 1".to_string()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be >= 1".to_string()));
        }
        if !(0.1..=1.0).contains(&self.sample_ratio) {
            warn!(
                sample_ratio = self.sample_ratio,
                "sample ratio outside [0.1, 1.0] will be clamped"
            );
        }
        Ok(())
    }
}
