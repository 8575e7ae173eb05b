//! Data source abstraction for receiving metric payloads.
//!
//! The dashboard never talks to the backend directly. It asks a
//! [`MetricsSource`] for a [`QueryKey`] and polls for [`SourceUpdate`]s,
//! which lets the same UI run against the HTTP API, a JSON file, or an
//! in-process channel.

mod channel;
mod file;
mod http;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::HttpSource;

use std::fmt::{self, Debug};

use pikawatch_client::{ClientError, Endpoint, MetricsQuery, PikaClient};
use pikawatch_types::{MetricSeries, MetricType, NetworkByInterfaceResponse, TimeWindow};

/// Identity of one chart's data: the query plus the endpoint it is sent to.
///
/// Covers entity id, metric type, window bounds and interface, so two
/// equal keys always describe the same backend request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub query: MetricsQuery,
    pub endpoint: Endpoint,
}

impl QueryKey {
    pub fn new(query: MetricsQuery, endpoint: Endpoint) -> Self {
        Self { query, endpoint }
    }

    pub fn metric_type(&self) -> MetricType {
        self.query.metric_type()
    }

    pub fn window(&self) -> TimeWindow {
        self.query.window()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}?{}",
            self.query.path(self.endpoint),
            self.query.query_string(self.endpoint)
        )
    }
}

/// Decoded body of one response.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsPayload {
    /// Named series from the agent metrics or monitor history endpoints.
    Series(Vec<MetricSeries>),
    /// Per-interface throughput samples.
    Interfaces(NetworkByInterfaceResponse),
}

impl MetricsPayload {
    /// Interface names present in the payload, sorted.
    pub fn interfaces(&self) -> Vec<String> {
        match self {
            MetricsPayload::Series(series) => {
                let mut names: Vec<String> = series
                    .iter()
                    .filter_map(|s| s.labels.get("interface").cloned())
                    .collect();
                names.sort();
                names.dedup();
                names
            }
            MetricsPayload::Interfaces(resp) => resp.interfaces(),
        }
    }
}

/// A payload together with the key it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUpdate {
    pub key: QueryKey,
    pub payload: MetricsPayload,
}

/// Trait for receiving metric payloads from various sources.
///
/// # Example
///
/// ```
/// use pikawatch::{ChannelSource, MetricsPayload, MetricsSource, QueryKey};
/// use pikawatch_client::{Endpoint, MetricsQuery};
/// use pikawatch_types::{MetricType, RangeToken};
///
/// let (tx, mut source) = ChannelSource::create("demo");
/// let query = MetricsQuery::builder("agent-1", MetricType::Cpu)
///     .range(RangeToken::H1)
///     .build()
///     .unwrap();
/// source.request(QueryKey::new(query, Endpoint::AgentMetrics));
///
/// tx.send(Some(MetricsPayload::Series(Vec::new()))).unwrap();
/// assert!(source.poll().is_some());
/// ```
pub trait MetricsSource: Send + Debug {
    /// Select the query whose results `poll` should return.
    ///
    /// Requesting the key that is already active is a no-op.
    fn request(&mut self, key: QueryKey);

    /// Poll for the latest payload. Non-blocking.
    fn poll(&mut self) -> Option<SourceUpdate>;

    /// Re-fetch the active query as soon as possible.
    fn refresh(&mut self) {}

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;

    /// The error from the most recent fetch, if it failed.
    fn error(&self) -> Option<&str>;
}

/// Fetch one key through the client, dispatching on its endpoint.
pub async fn fetch(client: &PikaClient, key: &QueryKey) -> Result<MetricsPayload, ClientError> {
    match key.endpoint {
        Endpoint::AgentMetrics => {
            let resp = client.metrics(&key.query).await?;
            Ok(MetricsPayload::Series(resp.series))
        }
        Endpoint::NetworkByInterface => {
            let resp = client.network_by_interface(&key.query).await?;
            Ok(MetricsPayload::Interfaces(resp))
        }
        Endpoint::MonitorHistory => {
            let resp = client.monitor_history(&key.query).await?;
            Ok(MetricsPayload::Series(resp.series))
        }
    }
}
