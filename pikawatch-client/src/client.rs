//! Async HTTP client for the Pika Monitor metrics API.
//!
//! ## Endpoints
//!
//! - `GET /agents/{id}/metrics` → [`MetricsResponse`]
//! - `GET /agents/{id}/metrics/network-by-interface` → [`NetworkByInterfaceResponse`]
//! - `GET /monitors/{id}/history` → [`MonitorHistoryResponse`]
//!
//! There are no retries here. A failed request surfaces as a [`ClientError`]
//! and the caller decides whether to poll again.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use pikawatch_types::{MetricsResponse, MonitorHistoryResponse, NetworkByInterfaceResponse};

use crate::{ClientError, Endpoint, MetricsQuery, Session};

/// Client for the Pika Monitor backend.
#[derive(Debug, Clone)]
pub struct PikaClient {
    client: Client,
    endpoint: String,
    session: Session,
}

impl PikaClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PikaClientBuilder {
        PikaClientBuilder::default()
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Session whose token is attached to every request.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch agent metrics for a query.
    pub async fn metrics(&self, query: &MetricsQuery) -> Result<MetricsResponse, ClientError> {
        self.get_json(query, Endpoint::AgentMetrics).await
    }

    /// Fetch per-interface network throughput for an agent.
    pub async fn network_by_interface(
        &self,
        query: &MetricsQuery,
    ) -> Result<NetworkByInterfaceResponse, ClientError> {
        self.get_json(query, Endpoint::NetworkByInterface).await
    }

    /// Fetch the history of a service monitor.
    pub async fn monitor_history(
        &self,
        query: &MetricsQuery,
    ) -> Result<MonitorHistoryResponse, ClientError> {
        self.get_json(query, Endpoint::MonitorHistory).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &MetricsQuery,
        endpoint: Endpoint,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.endpoint, query.path(endpoint));
        debug!(url = %url, query = %query.query_string(endpoint), "fetching");

        let mut request = self.client.get(&url).query(&query.params(endpoint));
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "token rejected, clearing session");
            self.session.clear();
            return Err(ClientError::Auth("Invalid or expired token".to_string()));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!(
                "'{}' not found",
                query.entity_id()
            )));
        }

        if !status.is_success() {
            return Err(ClientError::Http(format!("API returned status {}", status)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Builder for [`PikaClient`].
#[derive(Debug, Default)]
pub struct PikaClientBuilder {
    endpoint: Option<String>,
    session: Option<Session>,
    timeout: Option<Duration>,
}

impl PikaClientBuilder {
    /// Set the API base URL (e.g., "http://localhost:8080/api").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Share an existing session.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Shorthand for a session holding `token`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.session = Some(Session::with_token(token));
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PikaClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8080/api".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(PikaClient {
            client,
            endpoint,
            session: self.session.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pikawatch_types::{MetricType, RangeToken};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single canned HTTP response and report the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&buf).to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{}/api/", addr), rx)
    }

    fn network_query() -> MetricsQuery {
        MetricsQuery::builder("agent-1", MetricType::Network)
            .range(RangeToken::H1)
            .interface("eth0")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = PikaClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/api");
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = PikaClient::builder()
            .endpoint("http://pika.local/api/")
            .token("t")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://pika.local/api");
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_metrics_success() {
        let body = r#"{"agentId":"agent-1","type":"network","range":"1h","series":[{"name":"upload","data":[{"timestamp":1000,"value":1048576}]}]}"#;
        let (endpoint, request) = serve_once("200 OK", body).await;

        let client = PikaClient::builder().endpoint(endpoint).token("secret").build().unwrap();
        let resp = client.metrics(&network_query()).await.unwrap();

        assert_eq!(resp.series.len(), 1);
        assert_eq!(resp.series[0].name, "upload");

        let head = request.await.unwrap();
        assert!(head.starts_with(
            "GET /api/agents/agent-1/metrics?type=network&range=1h&interface=eth0 HTTP/1.1"
        ));
        assert!(head.to_lowercase().contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let (endpoint, _request) = serve_once("401 Unauthorized", "{}").await;

        let session = Session::with_token("stale");
        let client = PikaClient::builder().endpoint(endpoint).session(session.clone()).build().unwrap();

        let err = client.metrics(&network_query()).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_not_found() {
        let (endpoint, _request) = serve_once("404 Not Found", "{}").await;
        let client = PikaClient::builder().endpoint(endpoint).build().unwrap();

        let err = client.monitor_history(&network_query()).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let (endpoint, _request) = serve_once("500 Internal Server Error", "oops").await;
        let client = PikaClient::builder().endpoint(endpoint).build().unwrap();

        let err = client.metrics(&network_query()).await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (endpoint, _request) = serve_once("200 OK", "not json").await;
        let client = PikaClient::builder().endpoint(endpoint).build().unwrap();

        let err = client.network_by_interface(&network_query()).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
