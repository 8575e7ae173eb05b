//! Query parameter construction for the metrics endpoints.
//!
//! A [`MetricsQuery`] always carries exactly one time window. When both a
//! range token and explicit bounds are given, the bounds win and the range
//! is never sent.

use pikawatch_types::{MetricType, RangeToken, TimeWindow};

use crate::ClientError;

/// Backend endpoint a query is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /agents/{id}/metrics`
    AgentMetrics,
    /// `GET /agents/{id}/metrics/network-by-interface`
    NetworkByInterface,
    /// `GET /monitors/{id}/history`
    MonitorHistory,
}

/// A validated metrics query.
///
/// # Example
///
/// ```rust
/// use pikawatch_client::{Endpoint, MetricsQuery};
/// use pikawatch_types::{MetricType, RangeToken};
///
/// let query = MetricsQuery::builder("agent-1", MetricType::Network)
///     .range(RangeToken::H1)
///     .interface("eth0")
///     .build()
///     .unwrap();
///
/// assert_eq!(query.path(Endpoint::AgentMetrics), "/agents/agent-1/metrics");
/// assert_eq!(
///     query.query_string(Endpoint::AgentMetrics),
///     "type=network&range=1h&interface=eth0"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricsQuery {
    entity_id: String,
    metric_type: MetricType,
    window: TimeWindow,
    interface: Option<String>,
}

impl MetricsQuery {
    /// Create a builder for a query against an agent or monitor id.
    pub fn builder(entity_id: impl Into<String>, metric_type: MetricType) -> MetricsQueryBuilder {
        MetricsQueryBuilder::new(entity_id, metric_type)
    }

    /// Agent or monitor id.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Requested metric type.
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Active time window.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Interface filter (only ever set for network metrics).
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Request path for the given endpoint, with the id percent-encoded.
    pub fn path(&self, endpoint: Endpoint) -> String {
        let id = encode_component(&self.entity_id);
        match endpoint {
            Endpoint::AgentMetrics => format!("/agents/{}/metrics", id),
            Endpoint::NetworkByInterface => {
                format!("/agents/{}/metrics/network-by-interface", id)
            }
            Endpoint::MonitorHistory => format!("/monitors/{}/history", id),
        }
    }

    /// Ordered query parameters for the given endpoint.
    ///
    /// `type` is only sent to the agent metrics endpoint, and `interface`
    /// only accompanies network metrics there.
    pub fn params(&self, endpoint: Endpoint) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);

        if endpoint == Endpoint::AgentMetrics {
            params.push(("type", self.metric_type.as_str().to_string()));
        }

        match self.window {
            TimeWindow::Range(token) => params.push(("range", token.as_str().to_string())),
            TimeWindow::Explicit { start, end } => {
                params.push(("start", start.to_string()));
                params.push(("end", end.to_string()));
            }
        }

        if endpoint == Endpoint::AgentMetrics {
            if let Some(ref interface) = self.interface {
                params.push(("interface", interface.clone()));
            }
        }

        params
    }

    /// Encoded query string (without the leading `?`).
    pub fn query_string(&self, endpoint: Endpoint) -> String {
        self.params(endpoint)
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Builder for [`MetricsQuery`].
#[derive(Debug, Clone)]
pub struct MetricsQueryBuilder {
    entity_id: String,
    metric_type: MetricType,
    range: Option<RangeToken>,
    start: Option<i64>,
    end: Option<i64>,
    interface: Option<String>,
}

impl MetricsQueryBuilder {
    fn new(entity_id: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            entity_id: entity_id.into(),
            metric_type,
            range: None,
            start: None,
            end: None,
            interface: None,
        }
    }

    /// Set a relative range.
    pub fn range(mut self, range: RangeToken) -> Self {
        self.range = Some(range);
        self
    }

    /// Set explicit bounds in epoch milliseconds. These take precedence over
    /// any range.
    pub fn between(mut self, start: i64, end: i64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Set only the start bound.
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Set only the end bound.
    pub fn end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    /// Apply an already-resolved window.
    pub fn window(self, window: TimeWindow) -> Self {
        match window {
            TimeWindow::Range(token) => self.range(token),
            TimeWindow::Explicit { start, end } => self.between(start, end),
        }
    }

    /// Filter by network interface. Ignored for non-network metrics.
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Optional variant of [`interface`](Self::interface).
    pub fn maybe_interface(mut self, interface: Option<String>) -> Self {
        self.interface = interface;
        self
    }

    /// Validate and build the query.
    pub fn build(self) -> Result<MetricsQuery, ClientError> {
        if self.entity_id.trim().is_empty() {
            return Err(ClientError::InvalidQuery("entity id is empty".to_string()));
        }

        let window = TimeWindow::resolve(self.range, self.start, self.end).ok_or_else(|| {
            ClientError::InvalidQuery("either range or both start and end are required".to_string())
        })?;

        if let TimeWindow::Explicit { start, end } = window {
            if start > end {
                return Err(ClientError::InvalidQuery(format!(
                    "start {} is after end {}",
                    start, end
                )));
            }
        }

        let interface = if self.metric_type.is_network() {
            self.interface.filter(|i| !i.is_empty())
        } else {
            None
        };

        Ok(MetricsQuery {
            entity_id: self.entity_id,
            metric_type: self.metric_type,
            window,
            interface,
        })
    }
}

// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
