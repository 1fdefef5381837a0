use error::AdapterError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use util::DataSourceRegistry;

/// Settings of one adapter instance, read from a toml file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// instance key, selects the mapping configs tagged with it
    #[serde(default)]
    pub key: Option<String>,
    /// comma separated `host:port` list, empty for a dry run
    #[serde(default)]
    pub hosts: String,
    /// directory with the mapping definitions, relative to the config file
    #[serde(default = "default_mappings")]
    pub mappings: PathBuf,
    /// search client settings such as `cluster.name`
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    #[serde(default)]
    pub data_sources: DataSourceRegistry,
}

fn default_mappings() -> PathBuf {
    PathBuf::from("es")
}

impl AdapterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AdapterConfig, AdapterError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config: AdapterConfig = toml::from_str(&content)?;

        if config.mappings.is_relative() {
            let base = path.parent().unwrap_or(Path::new("."));
            config.mappings = base.join(&config.mappings);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_with_relative_mappings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.toml");
        fs::write(
            &path,
            r#"
            key = "es1"
            hosts = "127.0.0.1:9200"

            [properties]
            "cluster.name" = "elasticsearch"

            [dataSources.defaultDS]
            url = "jdbc:mysql://127.0.0.1:3306/mytest?useUnicode=true"
            "#,
        )
        .unwrap();

        let config = AdapterConfig::load(&path).unwrap();
        assert_eq!(config.key.as_deref(), Some("es1"));
        assert_eq!(config.hosts, "127.0.0.1:9200");
        assert_eq!(config.mappings, dir.path().join("es"));
        assert_eq!(config.properties["cluster.name"], "elasticsearch");
        assert!(config.data_sources.get("defaultDS").is_some());
    }

    #[test]
    fn defaults_for_dry_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.toml");
        fs::write(&path, "mappings = \"/etc/canal/es\"").unwrap();

        let config = AdapterConfig::load(&path).unwrap();
        assert_eq!(config.key, None);
        assert!(config.hosts.is_empty());
        assert_eq!(config.mappings, PathBuf::from("/etc/canal/es"));
        assert!(config.data_sources.is_empty());
        assert!(config.properties.is_empty());
    }
}
