use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::stores::NewStore;
use crate::ConfigError;

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<NewStore>,
}

/// Load and validate the seed stores from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores_file(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_stores_file(&content)
}

fn parse_stores_file(content: &str) -> Result<StoresFile, ConfigError> {
    let stores_file: StoresFile = serde_yaml::from_str(content)?;
    validate_stores(&stores_file)?;
    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for store in &stores_file.stores {
        store
            .validate()
            .map_err(|e| ConfigError::Validation(format!("store '{}': {e}", store.name)))?;

        // Exact match, same as the `(name, address)` unique index.
        if !seen.insert((store.name.as_str(), store.address.as_str())) {
            return Err(ConfigError::Validation(format!(
                "duplicate store: '{}' at '{}'",
                store.name, store.address
            )));
        }
    }

    Ok(())
}
