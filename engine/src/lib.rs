mod connection;
mod elastic;
pub mod engine;
mod memory;
mod result;
mod service;

pub use connection::ElasticConnection;
pub use elastic::Elastic;
pub use engine::Engine;
pub use memory::Memory;
pub use result::{CountResult, EtlResult};
pub use service::{DebugEtl, DebugSync, EtlService, SyncService};
