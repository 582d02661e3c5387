//! Layered configuration
//!
//! Values are resolved in order, later layers winning:
//!
//! 1. Built-in defaults
//! 2. User config (`<config dir>/mtbf/config.yaml`)
//! 3. Project config (`.mtbf/config.yaml`, searched upward from the working directory)
//! 4. Environment variables (`MTBF_PARAMETER_POLICY`, `MTBF_PRECISION`,
//!    `MTBF_GENERATOR_TOLERANCE`)

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::component::ParameterPolicy;
use crate::core::markov::ROW_SUM_TOLERANCE;
use crate::core::system::{AnalysisOptions, DEFAULT_RELIABILITY_TIMES};

/// Project directory holding the local config
pub const PROJECT_DIR: &str = ".mtbf";

/// Config file name, both in the user config dir and the project dir
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(mtbf::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    #[diagnostic(code(mtbf::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{key}': {message}")]
    #[diagnostic(code(mtbf::config::invalid_value))]
    InvalidValue { key: String, message: String },
}

/// Effective settings after all layers are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sample times (hours) for the reliability table
    pub reliability_times: Vec<f64>,

    /// Absolute row-sum tolerance for generator matrices
    pub generator_tolerance: f64,

    /// Missing-parameter handling
    pub parameter_policy: ParameterPolicy,

    /// Decimal places for hour values in reports
    pub precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reliability_times: DEFAULT_RELIABILITY_TIMES.to_vec(),
            generator_tolerance: ROW_SUM_TOLERANCE,
            parameter_policy: ParameterPolicy::Strict,
            precision: 2,
        }
    }
}

/// One config file; absent keys leave lower layers untouched
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    reliability_times: Option<Vec<f64>>,
    generator_tolerance: Option<f64>,
    parameter_policy: Option<ParameterPolicy>,
    precision: Option<usize>,
}

impl Config {
    /// Load from the user config, the project config above the current
    /// directory and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        let user = Self::user_config_path();
        Self::load_layers(user.as_deref(), &cwd, |key| std::env::var(key).ok())
    }

    /// Load with an explicit user config path, search root and environment
    pub fn load_layers<F>(
        user_config: Option<&Path>,
        start_dir: &Path,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = user_config {
            if path.exists() {
                log::debug!("Loading user config {}", path.display());
                config.apply(read_layer(path)?);
            }
        }

        if let Some(path) = Self::find_project_config(start_dir) {
            log::debug!("Loading project config {}", path.display());
            config.apply(read_layer(&path)?);
        }

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/mtbf/config.yaml`, if the platform has a config dir
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mtbf")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Nearest `.mtbf/config.yaml` at or above `start`
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_DIR).join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(times) = layer.reliability_times {
            self.reliability_times = times;
        }
        if let Some(tolerance) = layer.generator_tolerance {
            self.generator_tolerance = tolerance;
        }
        if let Some(policy) = layer.parameter_policy {
            self.parameter_policy = policy;
        }
        if let Some(precision) = layer.precision {
            self.precision = precision;
        }
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env("MTBF_PARAMETER_POLICY") {
            self.parameter_policy =
                value
                    .parse()
                    .map_err(|message| ConfigError::InvalidValue {
                        key: "MTBF_PARAMETER_POLICY".to_string(),
                        message,
                    })?;
        }
        if let Some(value) = env("MTBF_PRECISION") {
            self.precision = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "MTBF_PRECISION".to_string(),
                message: format!("expected a non-negative integer, got '{}'", value),
            })?;
        }
        if let Some(value) = env("MTBF_GENERATOR_TOLERANCE") {
            self.generator_tolerance =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "MTBF_GENERATOR_TOLERANCE".to_string(),
                    message: format!("expected a number, got '{}'", value),
                })?;
        }
        Ok(())
    }

    /// Reject values no analysis could use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.generator_tolerance.is_finite() && self.generator_tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "generator_tolerance".to_string(),
                message: format!("must be a positive number, got {}", self.generator_tolerance),
            });
        }
        if let Some(t) = self
            .reliability_times
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0)
        {
            return Err(ConfigError::InvalidValue {
                key: "reliability_times".to_string(),
                message: format!("times must be non-negative hours, got {}", t),
            });
        }
        if self.precision > 12 {
            return Err(ConfigError::InvalidValue {
                key: "precision".to_string(),
                message: format!("at most 12 decimal places, got {}", self.precision),
            });
        }
        Ok(())
    }

    /// Aggregation options derived from this config
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            time_points: self.reliability_times.clone(),
            policy: self.parameter_policy,
        }
    }

    /// Commented starter file written by `mtbf init`
    pub fn starter_yaml() -> String {
        let defaults = Config::default();
        let times: Vec<String> = defaults
            .reliability_times
            .iter()
            .map(|t| format!("{}", t))
            .collect();
        format!(
            "# MTBF toolkit project settings\n\
             \n\
             # Hours at which R(t) and Q(t) are tabulated\n\
             reliability_times: [{}]\n\
             \n\
             # Generator matrix rows must sum to zero within this tolerance\n\
             generator_tolerance: {:e}\n\
             \n\
             # strict: missing parameters are errors; lenient: use type defaults\n\
             parameter_policy: {}\n\
             \n\
             # Decimal places for hour values\n\
             precision: {}\n",
            times.join(", "),
            defaults.generator_tolerance,
            defaults.parameter_policy,
            defaults.precision
        )
    }
}

fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
