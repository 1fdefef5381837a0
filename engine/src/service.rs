use crate::engine::Engine;
use crate::result::EtlResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use util::{Dml, MappingConfig};

/// Applies a routed change event to the documents of the matched configs. Decides per config
/// whether the changed row actually participates in the mapping.
#[async_trait]
pub trait SyncService: Send + Sync {
    async fn sync(&self, configs: &[Arc<MappingConfig>], dml: &Dml) -> anyhow::Result<()>;
}

/// Bulk loads the source rows of one config into its index.
#[async_trait]
pub trait EtlService: Send + Sync {
    async fn import(
        &self,
        engine: &Engine,
        config: &MappingConfig,
        params: &[String],
    ) -> anyhow::Result<EtlResult>;
}

/// Logs routed events instead of writing them.
#[derive(Clone, Debug, Default)]
pub struct DebugSync;

#[async_trait]
impl SyncService for DebugSync {
    async fn sync(&self, configs: &[Arc<MappingConfig>], dml: &Dml) -> anyhow::Result<()> {
        for config in configs {
            info!(
                "{} {}.{} ({} rows) -> {} [{}]",
                dml.event_type,
                dml.database,
                dml.table,
                dml.data.len(),
                config.mapping.index,
                config.key
            );
        }
        Ok(())
    }
}

/// Reports what an import would load without touching the source.
#[derive(Clone, Debug, Default)]
pub struct DebugEtl;

#[async_trait]
impl EtlService for DebugEtl {
    async fn import(
        &self,
        engine: &Engine,
        config: &MappingConfig,
        params: &[String],
    ) -> anyhow::Result<EtlResult> {
        let condition = match (&config.mapping.etl_condition, params.is_empty()) {
            (Some(condition), false) => format!(" {} with {:?}", condition, params),
            _ => String::new(),
        };
        info!("Dry run import of {} into {}", config.key, engine);
        Ok(EtlResult::success(format!(
            "dry run: {} -> {}{}",
            config.key, config.mapping.index, condition
        )))
    }
}
