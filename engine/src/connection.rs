use anyhow::{bail, Context};
use std::fmt::{Display, Formatter};

/// One `host:port` pair of the search cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ElasticConnection {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl ElasticConnection {
    /// Parses a comma separated `host:port` list.
    pub fn parse_hosts(hosts: &str) -> anyhow::Result<Vec<ElasticConnection>> {
        let mut connections = vec![];
        for host in hosts.split(',').map(str::trim).filter(|h| !h.is_empty()) {
            let Some((name, port)) = host.rsplit_once(':') else {
                bail!("host {} is missing a port", host)
            };
            let port = port
                .parse::<u16>()
                .with_context(|| format!("invalid port in host {}", host))?;
            connections.push(ElasticConnection {
                host: name.to_string(),
                port,
            });
        }
        Ok(connections)
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Display for ElasticConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
