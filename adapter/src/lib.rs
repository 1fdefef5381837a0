mod adapter;
mod count;
mod dispatcher;
mod etl;
mod filter;
mod routing;
mod schema;

pub use adapter::{EsAdapter, EsAdapterBuilder};
pub use count::count;
pub use dispatcher::route;
pub use etl::{EtlOutcome, EtlReport, EtlRun, TASK_NOT_FOUND, resolve_and_run};
pub use filter::filter_configs;
pub use routing::{RouteKey, Routing, RoutingIndex};
pub use schema::{JdbcSchemaResolver, SchemaResolver};
