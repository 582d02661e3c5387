//! YAML loading for system and Markov files

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::entities::{MarkovModel, SystemModel};
use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content, reporting errors against `filename`
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse a YAML file from disk
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content, &path.display().to_string())
}

/// Load a system file
pub fn load_system(path: &Path) -> Result<SystemModel, YamlError> {
    parse_yaml_file(path)
}

/// Load a Markov file
pub fn load_markov(path: &Path) -> Result<MarkovModel, YamlError> {
    parse_yaml_file(path)
}
