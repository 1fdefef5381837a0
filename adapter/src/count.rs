use crate::routing::Routing;
use engine::{CountResult, Engine};
use error::AdapterError;
use tracing::debug;

/// Counts the documents in the index of the config named `task`. Destinations are not
/// resolved, a count always targets one index.
pub async fn count(routing: &Routing, engine: &Engine, task: &str) -> Result<CountResult, AdapterError> {
    let config = routing
        .config(task)
        .ok_or_else(|| AdapterError::TaskNotFound(task.to_string()))?;
    let mapping = &config.mapping;

    let count = engine.count(&mapping.index, mapping.doc_type.as_deref()).await?;
    debug!("{} holds {} documents", mapping.index, count);

    Ok(CountResult {
        index: mapping.index.clone(),
        count,
    })
}
