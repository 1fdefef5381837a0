use crate::definition::{MappingConfig, RawMappingConfig};
use error::AdapterError;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const EXTENSION: &str = "toml";

/// Loads every `*.toml` mapping definition of a directory, ordered by file name.
/// The file name is the key of the definition.
pub fn load_configs<P: AsRef<Path>>(dir: P) -> Result<Vec<MappingConfig>, AdapterError> {
    let dir = dir.as_ref();
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|e| e == EXTENSION));
    paths.sort();

    let mut configs = vec![];
    for path in paths {
        let Some(key) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let content = fs::read_to_string(&path)?;
        let raw: RawMappingConfig = toml::from_str(&content)?;
        debug!("Loaded mapping {} from {}", key, path.display());
        configs.push(MappingConfig::compile(key, raw)?);
    }

    info!("Loaded {} mapping configs from {}", configs.len(), dir.display());
    Ok(configs)
}
