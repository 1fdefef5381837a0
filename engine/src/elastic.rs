use crate::connection::ElasticConnection;
use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

const CLUSTER_NAME: &str = "cluster.name";

/// Elasticsearch over its REST interface.
#[derive(Clone, Debug)]
pub struct Elastic {
    pub(crate) hosts: Vec<ElasticConnection>,
    properties: IndexMap<String, String>,
    client: Client,
    closed: Arc<AtomicBool>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    cluster_name: String,
}

/// Why a host was passed over.
enum Skip {
    Unavailable(anyhow::Error),
    Failed(anyhow::Error),
}

impl Elastic {
    /// `properties` are the client settings of the adapter config, `cluster.name` restricts
    /// requests to hosts of that cluster.
    pub fn new(
        hosts: Vec<ElasticConnection>,
        properties: IndexMap<String, String>,
    ) -> anyhow::Result<Self> {
        if hosts.is_empty() {
            bail!("no elasticsearch host configured")
        }
        for (name, value) in properties.iter().filter(|(k, _)| *k != CLUSTER_NAME) {
            debug!("Ignoring client property {} = {}", name, value);
        }
        Ok(Elastic {
            hosts,
            properties,
            client: Client::new(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Tries the hosts in order until one answers. Unreachable hosts, server errors and hosts
    /// of a foreign cluster move on to the next host, any other failure is returned.
    pub(crate) async fn count(&self, index: &str, doc_type: Option<&str>) -> anyhow::Result<u64> {
        if self.closed.load(Ordering::Acquire) {
            bail!("elasticsearch client is closed")
        }

        let path = match doc_type {
            Some(t) => format!("{}/{}/_count", index, t),
            None => format!("{}/_count", index),
        };

        let mut last_err = anyhow!("no elasticsearch host configured");
        for host in &self.hosts {
            match self.count_on(host, &path).await {
                Ok(count) => return Ok(count),
                Err(Skip::Unavailable(err)) => {
                    warn!("Host {} not available: {}", host, err);
                    last_err = err;
                }
                Err(Skip::Failed(err)) => return Err(err),
            }
        }
        Err(last_err)
    }

    async fn count_on(&self, host: &ElasticConnection, path: &str) -> Result<u64, Skip> {
        if let Some(expected) = self.properties.get(CLUSTER_NAME) {
            let info: InfoResponse = self.get(host, "").await?;
            if &info.cluster_name != expected {
                return Err(Skip::Unavailable(anyhow!(
                    "host belongs to cluster {}, expected {}",
                    info.cluster_name,
                    expected
                )));
            }
        }
        let response: CountResponse = self.get(host, path).await?;
        Ok(response.count)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        host: &ElasticConnection,
        path: &str,
    ) -> Result<T, Skip> {
        let url = format!("{}/{}", host.base_url(), path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| Skip::Unavailable(err.into()))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Skip::Unavailable(anyhow!("{} answered {}", url, status)));
        }
        if !status.is_success() {
            return Err(Skip::Failed(anyhow!("{} answered {}", url, status)));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| Skip::Failed(err.into()))
    }

    pub(crate) fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Closed elasticsearch client");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one connection per canned response and records the request lines.
    struct StubServer {
        host: ElasticConnection,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl StubServer {
        async fn start(responses: Vec<(u16, &'static str)>) -> StubServer {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let requests = Arc::new(Mutex::new(vec![]));
            let seen = requests.clone();

            tokio::spawn(async move {
                for (status, body) in responses {
                    let (mut socket, _) = listener.accept().await.unwrap();
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    loop {
                        let n = socket.read(&mut buf[read..]).await.unwrap();
                        read += n;
                        if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]).to_string();
                    seen.lock().push(request.lines().next().unwrap_or_default().to_string());

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.unwrap();
                }
            });

            StubServer {
                host: ElasticConnection {
                    host: addr.ip().to_string(),
                    port: addr.port(),
                },
                requests,
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    fn elastic(hosts: &[&StubServer], properties: &[(&str, &str)]) -> Elastic {
        let properties = properties
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut elastic =
            Elastic::new(hosts.iter().map(|s| s.host.clone()).collect(), properties).unwrap();
        // stubs listen on loopback, keep proxies of the environment out of the way
        elastic.client = Client::builder().no_proxy().build().unwrap();
        elastic
    }

    #[tokio::test]
    async fn count_with_type() {
        let server = StubServer::start(vec![(
            200,
            r#"{"count":7,"_shards":{"total":1,"successful":1,"skipped":0,"failed":0}}"#,
        )])
        .await;

        let count = elastic(&[&server], &[]).count("users", Some("_doc")).await.unwrap();

        assert_eq!(count, 7);
        assert_eq!(server.requests(), vec!["GET /users/_doc/_count HTTP/1.1"]);
    }

    #[tokio::test]
    async fn count_without_type() {
        let server = StubServer::start(vec![(200, r#"{"count":0}"#)]).await;

        let count = elastic(&[&server], &[]).count("users", None).await.unwrap();

        assert_eq!(count, 0);
        assert_eq!(server.requests(), vec!["GET /users/_count HTTP/1.1"]);
    }

    #[tokio::test]
    async fn server_error_moves_to_next_host() {
        let broken = StubServer::start(vec![(503, r#"{"error":"unavailable"}"#)]).await;
        let healthy = StubServer::start(vec![(200, r#"{"count":3}"#)]).await;

        let count = elastic(&[&broken, &healthy], &[]).count("users", None).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(broken.requests().len(), 1);
        assert_eq!(healthy.requests().len(), 1);
    }

    #[tokio::test]
    async fn client_error_is_returned() {
        let missing = StubServer::start(vec![(404, r#"{"error":"index_not_found_exception"}"#)]).await;
        let other = StubServer::start(vec![(200, r#"{"count":3}"#)]).await;

        let err = elastic(&[&missing, &other], &[])
            .count("nope", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("404"));
        assert!(other.requests().is_empty());
    }

    #[tokio::test]
    async fn foreign_cluster_is_skipped() {
        let foreign = StubServer::start(vec![(200, r#"{"cluster_name":"test"}"#)]).await;
        let own = StubServer::start(vec![
            (200, r#"{"cluster_name":"prod"}"#),
            (200, r#"{"count":11}"#),
        ])
        .await;

        let elastic = elastic(&[&foreign, &own], &[("cluster.name", "prod")]);
        let count = elastic.count("users", None).await.unwrap();

        assert_eq!(count, 11);
        assert_eq!(foreign.requests(), vec!["GET / HTTP/1.1"]);
        assert_eq!(
            own.requests(),
            vec!["GET / HTTP/1.1", "GET /users/_count HTTP/1.1"]
        );
        assert_eq!(elastic.properties()["cluster.name"], "prod");
    }

    #[tokio::test]
    async fn all_hosts_down() {
        let down = StubServer::start(vec![(500, "{}")]).await;

        let err = elastic(&[&down], &[]).count("users", None).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
