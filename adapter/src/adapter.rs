use crate::count::count;
use crate::dispatcher::route;
use crate::etl::resolve_and_run;
use crate::routing::Routing;
use crate::schema::{JdbcSchemaResolver, SchemaResolver};
use engine::{CountResult, DebugEtl, DebugSync, Engine, EtlResult, EtlService, SyncService};
use error::AdapterError;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use util::{DataSourceRegistry, Dml, MappingConfig};

/// Routes change events of a relational source into search indexes and runs full imports on
/// request.
///
/// The routing snapshot is built before the adapter is handed out and afterwards only ever
/// replaced as a whole, callers never observe a partially built index.
pub struct EsAdapter {
    key: Option<String>,
    registry: Arc<DataSourceRegistry>,
    resolver: Arc<dyn SchemaResolver>,
    routing: RwLock<Arc<Routing>>,
    engine: Engine,
    sync: Arc<dyn SyncService>,
    etl: Arc<dyn EtlService>,
    destroyed: AtomicBool,
}

pub struct EsAdapterBuilder {
    key: Option<String>,
    registry: DataSourceRegistry,
    resolver: Arc<dyn SchemaResolver>,
    engine: Engine,
    sync: Arc<dyn SyncService>,
    etl: Arc<dyn EtlService>,
}

impl EsAdapterBuilder {
    /// Only configs tagged with this key (or untagged configs when `None`) are served.
    pub fn key<S: AsRef<str>>(mut self, key: Option<S>) -> Self {
        self.key = key.map(|k| k.as_ref().to_string());
        self
    }

    pub fn registry(mut self, registry: DataSourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn SchemaResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn sync(mut self, sync: Arc<dyn SyncService>) -> Self {
        self.sync = sync;
        self
    }

    pub fn etl(mut self, etl: Arc<dyn EtlService>) -> Self {
        self.etl = etl;
        self
    }

    /// Builds the routing snapshot, any configuration error aborts the whole initialization.
    pub fn init(self, configs: Vec<MappingConfig>) -> Result<EsAdapter, AdapterError> {
        let routing = Routing::build(
            configs,
            self.key.as_deref(),
            &self.registry,
            self.resolver.as_ref(),
        )
        .inspect_err(|err| error!("Could not initialize adapter: {}", err))?;

        info!(
            "Adapter {} serves {} tables on {}",
            self.key.as_deref().unwrap_or("<default>"),
            routing.index().len(),
            self.engine
        );

        Ok(EsAdapter {
            key: self.key,
            registry: Arc::new(self.registry),
            resolver: self.resolver,
            routing: RwLock::new(Arc::new(routing)),
            engine: self.engine,
            sync: self.sync,
            etl: self.etl,
            destroyed: AtomicBool::new(false),
        })
    }
}

impl EsAdapter {
    pub fn builder(engine: Engine) -> EsAdapterBuilder {
        EsAdapterBuilder {
            key: None,
            registry: DataSourceRegistry::new(),
            resolver: Arc::new(JdbcSchemaResolver),
            engine,
            sync: Arc::new(DebugSync),
            etl: Arc::new(DebugEtl),
        }
    }

    /// Current snapshot, stays valid even if a reload swaps in a new one meanwhile.
    pub fn routing(&self) -> Arc<Routing> {
        self.routing.read().clone()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub async fn route(&self, dml: &Dml) -> Result<bool, AdapterError> {
        let routing = self.routing();
        route(&routing, self.sync.as_ref(), dml).await
    }

    /// Unknown tasks and failed imports are reported in the result, only errors of the
    /// collaborators are returned as `Err`.
    pub async fn etl(&self, task: &str, params: &[String]) -> Result<EtlResult, AdapterError> {
        let routing = self.routing();
        let run = resolve_and_run(&routing, &self.engine, self.etl.as_ref(), task, params).await?;
        Ok(run.into_result())
    }

    pub async fn count(&self, task: &str) -> Result<CountResult, AdapterError> {
        let routing = self.routing();
        count(&routing, &self.engine, task).await
    }

    pub fn destination(&self, task: &str) -> Option<String> {
        self.routing().config(task).map(|c| c.destination.clone())
    }

    /// Builds a new snapshot next to the live one and swaps it in. On error the live snapshot
    /// stays in place.
    pub fn reload(&self, configs: Vec<MappingConfig>) -> Result<(), AdapterError> {
        let routing = Routing::build(
            configs,
            self.key.as_deref(),
            &self.registry,
            self.resolver.as_ref(),
        )?;
        *self.routing.write() = Arc::new(routing);
        info!("Reloaded routing");
        Ok(())
    }

    /// Releases the search engine, repeated calls do nothing.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.engine.close();
        info!("Adapter {} destroyed", self.key.as_deref().unwrap_or("<default>"));
    }
}

impl Drop for EsAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}
