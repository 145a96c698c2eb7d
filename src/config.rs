use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning knobs for move ranking and the greedy solver, loadable from TOML.
///
/// ```
/// use tube_sort_solver::config::SolverConfig;
/// let config: SolverConfig = toml::from_str("max_candidates = 3").unwrap();
/// assert_eq!(config.max_candidates, 3);
/// assert_eq!(config.empty_destination_penalty, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// How many ranked candidates `top_moves` returns.
    pub max_candidates: usize,
    /// Subtracted from a move's score when its destination tube is empty.
    pub empty_destination_penalty: f64,
    /// Upper bound on solver iterations. `None` runs until the search settles.
    pub max_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_candidates: 5,
            empty_destination_penalty: 10.0,
            max_iterations: None,
        }
    }
}

impl SolverConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: SolverConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_candidates == 0 {
            return Err(ConfigError::Validation(
                "max_candidates must be > 0".into(),
            ));
        }
        if !self.empty_destination_penalty.is_finite() {
            return Err(ConfigError::Validation(
                "empty_destination_penalty must be a finite number".into(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::Validation(
                "max_iterations must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}
