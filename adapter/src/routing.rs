use crate::filter::filter_configs;
use crate::schema::SchemaResolver;
use error::AdapterError;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, info};
use util::{DataSourceRegistry, MappingConfig};

/// Source table a change event is tagged with.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RouteKey {
    pub schema: String,
    pub table: String,
}

impl RouteKey {
    pub fn new<S: AsRef<str>, T: AsRef<str>>(schema: S, table: T) -> Self {
        RouteKey {
            schema: schema.as_ref().to_string(),
            table: table.as_ref().to_string(),
        }
    }
}

impl Display for RouteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.schema, self.table)
    }
}

/// Which configs read from which source table. Frozen once built.
#[derive(Debug, Default)]
pub struct RoutingIndex {
    tables: IndexMap<RouteKey, Vec<Arc<MappingConfig>>>,
}

impl RoutingIndex {
    pub fn get(&self, key: &RouteKey) -> Option<&[Arc<MappingConfig>]> {
        self.tables.get(key).map(Vec::as_slice)
    }

    pub fn lookup(&self, schema: &str, table: &str) -> Option<&[Arc<MappingConfig>]> {
        self.get(&RouteKey::new(schema, table))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &[Arc<MappingConfig>])> {
        self.tables.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Everything the adapter looks up while running, built in one pass and only ever replaced
/// as a whole.
#[derive(Debug, Default)]
pub struct Routing {
    configs: IndexMap<String, Arc<MappingConfig>>,
    index: RoutingIndex,
}

impl Routing {
    /// Filters the configs for the adapter instance `key` and indexes them by source table.
    /// Fails on the first config that cannot be routed, nothing is built partially.
    pub fn build(
        configs: Vec<MappingConfig>,
        key: Option<&str>,
        registry: &DataSourceRegistry,
        resolver: &dyn SchemaResolver,
    ) -> Result<Routing, AdapterError> {
        let mut by_key: IndexMap<String, Arc<MappingConfig>> = IndexMap::new();
        let mut tables: IndexMap<RouteKey, Vec<Arc<MappingConfig>>> = IndexMap::new();

        for config in filter_configs(configs, key) {
            if by_key.contains_key(&config.key) {
                return Err(AdapterError::DuplicateKey(config.key));
            }

            let source = registry
                .get(&config.data_source_key)
                .filter(|s| s.is_described())
                .ok_or_else(|| AdapterError::DataSourceNotFound(config.data_source_key.clone()))?;
            let schema = resolver.resolve(&config.data_source_key, source)?;

            let config = Arc::new(config);
            for table in config.mapping.schema_item.tables() {
                let route = RouteKey::new(&schema, &table.table_name);
                debug!("Route {} -> {} (alias {})", route, config.key, table.alias);
                tables.entry(route).or_default().push(config.clone());
            }
            by_key.insert(config.key.clone(), config);
        }

        info!(
            "Built routing for {} configs over {} tables",
            by_key.len(),
            tables.len()
        );

        Ok(Routing {
            configs: by_key,
            index: RoutingIndex { tables },
        })
    }

    pub fn config(&self, key: &str) -> Option<&Arc<MappingConfig>> {
        self.configs.get(key)
    }

    /// All configs in load order.
    pub fn configs(&self) -> impl Iterator<Item = &Arc<MappingConfig>> {
        self.configs.values()
    }

    pub fn by_destination<'a>(
        &'a self,
        destination: &'a str,
    ) -> impl Iterator<Item = &'a Arc<MappingConfig>> + 'a {
        self.configs().filter(move |c| c.destination == destination)
    }

    pub fn index(&self) -> &RoutingIndex {
        &self.index
    }
}
