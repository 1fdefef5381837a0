use crate::routing::{RouteKey, Routing};
use engine::SyncService;
use error::AdapterError;
use tracing::{debug, error};
use util::Dml;

/// Hands a change event to the sync service together with every config reading its table.
/// Returns whether the event matched anything, unmapped tables are skipped silently.
pub async fn route(routing: &Routing, sync: &dyn SyncService, dml: &Dml) -> Result<bool, AdapterError> {
    let key = RouteKey::new(&dml.database, &dml.table);
    let Some(configs) = routing.index().get(&key) else {
        debug!("No mapping reads from {}, skipping {}", key, dml.event_type);
        return Ok(false);
    };

    sync.sync(configs, dml).await.map_err(|err| {
        error!("Could not sync {} event of {}: {}", dml.event_type, key, err);
        AdapterError::Downstream(err)
    })?;
    Ok(true)
}
