use error::AdapterError;
use once_cell::sync::Lazy;
use regex::Regex;
use util::DataSource;

// <scheme>:<driver>://<host>/<schema>?<params>
static JDBC_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".*:(.*)://.*/(.*)\?.*$").expect("jdbc url pattern is valid")
});

/// Determines the schema change events of a data source are tagged with.
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, key: &str, source: &DataSource) -> Result<String, AdapterError>;
}

/// Uses the explicit schema of a data source and falls back to the database segment of its
/// jdbc url.
#[derive(Clone, Copy, Debug, Default)]
pub struct JdbcSchemaResolver;

impl JdbcSchemaResolver {
    /// Returns `(driver, schema)` of a jdbc url, the driver is not used for routing.
    pub fn parse_url(url: &str) -> Option<(&str, &str)> {
        let captures = JDBC_URL.captures(url)?;
        let driver = captures.get(1)?.as_str();
        let schema = captures.get(2)?.as_str();
        Some((driver, schema))
    }
}

impl SchemaResolver for JdbcSchemaResolver {
    fn resolve(&self, key: &str, source: &DataSource) -> Result<String, AdapterError> {
        if let Some(schema) = &source.schema {
            return Ok(schema.clone());
        }
        source
            .url
            .as_deref()
            .and_then(Self::parse_url)
            .map(|(_, schema)| schema.to_string())
            .ok_or_else(|| AdapterError::SchemaNotFound(key.to_string()))
    }
}
