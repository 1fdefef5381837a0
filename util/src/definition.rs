use crate::mappings::{SchemaItem, SqlParser};
use error::AdapterError;
use serde::{Deserialize, Serialize};

const DEFAULT_COMMIT_BATCH: usize = 3000;

/// Defines which source query feeds which search index and for which adapter instance
/// and destination the definition is active.
#[derive(Clone, Debug, Serialize)]
pub struct MappingConfig {
    /// usually the name of the defining file
    pub key: String,
    pub adapter_key: Option<String>,
    pub data_source_key: String,
    pub destination: String,
    pub group_id: Option<String>,
    pub mapping: EsMapping,
}

impl MappingConfig {
    /// Compiles the mapping sql of a deserialized definition.
    pub fn compile<S: AsRef<str>>(key: S, raw: RawMappingConfig) -> Result<Self, AdapterError> {
        let key = key.as_ref().to_string();
        let schema_item = SqlParser::parse(&raw.es_mapping.sql)
            .map_err(|reason| AdapterError::invalid_mapping(&key, reason))?;

        let RawEsMapping {
            index,
            doc_type,
            id,
            pk,
            sql,
            etl_condition,
            commit_batch,
        } = raw.es_mapping;

        Ok(MappingConfig {
            key,
            adapter_key: raw.outer_adapter_key,
            data_source_key: raw.data_source_key,
            destination: raw.destination,
            group_id: raw.group_id,
            mapping: EsMapping {
                index,
                doc_type,
                id,
                pk,
                sql,
                etl_condition,
                commit_batch,
                schema_item,
            },
        })
    }

    /// Programmatic shortcut used by embedders and tests.
    pub fn new<K: AsRef<str>, D: AsRef<str>, S: AsRef<str>>(
        key: K,
        data_source_key: D,
        destination: S,
        index: &str,
        sql: &str,
    ) -> Result<Self, AdapterError> {
        Self::compile(
            key,
            RawMappingConfig {
                data_source_key: data_source_key.as_ref().to_string(),
                outer_adapter_key: None,
                destination: destination.as_ref().to_string(),
                group_id: None,
                es_mapping: RawEsMapping {
                    index: index.to_string(),
                    doc_type: None,
                    id: None,
                    pk: None,
                    sql: sql.to_string(),
                    etl_condition: None,
                    commit_batch: DEFAULT_COMMIT_BATCH,
                },
            },
        )
    }

    pub fn with_adapter_key<S: AsRef<str>>(mut self, key: Option<S>) -> Self {
        self.adapter_key = key.map(|k| k.as_ref().to_string());
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EsMapping {
    pub index: String,
    pub doc_type: Option<String>,
    pub id: Option<String>,
    pub pk: Option<String>,
    pub sql: String,
    pub etl_condition: Option<String>,
    pub commit_batch: usize,
    pub schema_item: SchemaItem,
}

/// On-disk shape of a mapping definition.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMappingConfig {
    pub data_source_key: String,
    #[serde(default)]
    pub outer_adapter_key: Option<String>,
    pub destination: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub es_mapping: RawEsMapping,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEsMapping {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub pk: Option<String>,
    pub sql: String,
    #[serde(default)]
    pub etl_condition: Option<String>,
    #[serde(default = "default_commit_batch")]
    pub commit_batch: usize,
}

fn default_commit_batch() -> usize {
    DEFAULT_COMMIT_BATCH
}
