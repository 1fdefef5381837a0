use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("No data source found: {0}")]
    DataSourceNotFound(String),

    #[error("Not found the schema of jdbc-url: {0}")]
    SchemaNotFound(String),

    #[error("duplicate mapping config key: {0}")]
    DuplicateKey(String),

    #[error("invalid mapping in {key}: {reason}")]
    InvalidMapping { key: String, reason: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("downstream error: {0}")]
    Downstream(#[from] anyhow::Error),

    #[error("wrapped error: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AdapterError {
    /// Configuration problems abort initialization, nothing else does.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AdapterError::DataSourceNotFound(_)
                | AdapterError::SchemaNotFound(_)
                | AdapterError::DuplicateKey(_)
                | AdapterError::InvalidMapping { .. }
        )
    }

    pub fn invalid_mapping<K: AsRef<str>, R: ToString>(key: K, reason: R) -> Self {
        AdapterError::InvalidMapping {
            key: key.as_ref().to_string(),
            reason: reason.to_string(),
        }
    }
}
