use buildspawn_core::block::{BlockClassifier, BlockKind};
use buildspawn_core::config::SpawnerConfig;
use std::collections::HashMap;
use thiserror::Error;

use crate::remote::RemoteBuildingEntry;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse catalog JSON: {0}")]
    CatalogParseError(String),
    #[error("Failed to parse spawner config RON: {0}")]
    ConfigParseError(String),
    #[error("Failed to parse block classification RON: {0}")]
    ClassifierParseError(String),
}

/// Parse the remote catalog (a JSON array of entries).
pub fn load_catalog_from_str(json: &str) -> Result<Vec<RemoteBuildingEntry>, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::CatalogParseError(e.to_string()))
}

/// Parse a spawner config RON string. Missing fields take their defaults and
/// out-of-range values are clamped.
pub fn load_config_from_str(ron_str: &str) -> Result<SpawnerConfig, LoadError> {
    let options = ron::Options::default();
    let config: SpawnerConfig = options
        .from_str(ron_str)
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))?;
    Ok(config.sanitized())
}

/// Parse a map of block id overrides, e.g. `{"mymod:ash": FLOOR}`.
pub fn load_classifier_from_str(ron_str: &str) -> Result<BlockClassifier, LoadError> {
    let options = ron::Options::default();
    let overrides: HashMap<String, BlockKind> = options
        .from_str(ron_str)
        .map_err(|e| LoadError::ClassifierParseError(e.to_string()))?;
    Ok(BlockClassifier::with_overrides(overrides))
}
