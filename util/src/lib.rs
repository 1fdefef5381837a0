pub mod datasource;
pub mod definition;
pub mod event;
pub mod loader;
pub mod mappings;

pub use datasource::{DataSource, DataSourceRegistry};
pub use definition::{EsMapping, MappingConfig, RawMappingConfig};
pub use event::{Dml, EventType, Row};
pub use loader::load_configs;
pub use mappings::{SchemaItem, SqlParser, TableItem};
