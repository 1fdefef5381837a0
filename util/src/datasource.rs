use indexmap::IndexMap;
use serde::Deserialize;

/// Connection metadata of a relational source as far as the adapter needs it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    #[serde(default)]
    pub url: Option<String>,
    /// explicit schema, takes precedence over the one in the url
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl DataSource {
    pub fn url<S: AsRef<str>>(url: S) -> Self {
        DataSource {
            url: Some(url.as_ref().to_string()),
            ..Default::default()
        }
    }

    pub fn schema<S: AsRef<str>>(schema: S) -> Self {
        DataSource {
            schema: Some(schema.as_ref().to_string()),
            ..Default::default()
        }
    }

    /// Without url or schema there is nothing to route on.
    pub fn is_described(&self) -> bool {
        self.url.is_some() || self.schema.is_some()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DataSourceRegistry {
    sources: IndexMap<String, DataSource>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: AsRef<str>>(&mut self, key: S, source: DataSource) {
        self.sources.insert(key.as_ref().to_string(), source);
    }

    pub fn with<S: AsRef<str>>(mut self, key: S, source: DataSource) -> Self {
        self.insert(key, source);
        self
    }

    pub fn get(&self, key: &str) -> Option<&DataSource> {
        self.sources.get(key)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
