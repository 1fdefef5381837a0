use crate::connection::ElasticConnection;
use crate::elastic::Elastic;
use crate::memory::Memory;
use indexmap::IndexMap;
use std::fmt::Display;

/// The search store documents end up in.
#[derive(Clone, Debug)]
pub enum Engine {
    Elastic(Elastic),
    Memory(Memory),
}

impl Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Elastic(e) => {
                let hosts = e.hosts.iter().map(|h| h.to_string()).collect::<Vec<_>>();
                write!(f, "elasticsearch[{}]", hosts.join(","))
            }
            Engine::Memory(_) => f.write_str("memory"),
        }
    }
}

impl Engine {
    pub fn elastic(hosts: &str, properties: IndexMap<String, String>) -> anyhow::Result<Engine> {
        let hosts = ElasticConnection::parse_hosts(hosts)?;
        Ok(Engine::Elastic(Elastic::new(hosts, properties)?))
    }

    pub fn memory() -> Engine {
        Engine::Memory(Memory::new())
    }

    /// Number of documents in the given index (and legacy type).
    pub async fn count(&self, index: &str, doc_type: Option<&str>) -> anyhow::Result<u64> {
        match self {
            Engine::Elastic(e) => e.count(index, doc_type).await,
            Engine::Memory(m) => m.count(index),
        }
    }

    /// Releases the connection, calling it again does nothing.
    pub fn close(&self) {
        match self {
            Engine::Elastic(e) => e.close(),
            Engine::Memory(m) => m.close(),
        }
    }
}

impl From<Memory> for Engine {
    fn from(value: Memory) -> Self {
        Engine::Memory(value)
    }
}
