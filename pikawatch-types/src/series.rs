//! Metric series and the backend response envelopes that carry them.

use std::collections::BTreeMap;

/// One timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricPoint {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    /// Raw sample value, in the backend's unit.
    pub value: f64,
}

impl MetricPoint {
    /// Create a new point.
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A named, ordered sequence of samples for one metric dimension
/// (one network interface, one agent, one monitor...).
///
/// # Example
///
/// ```rust
/// use pikawatch_types::MetricSeries;
///
/// let series = MetricSeries::new("response_time")
///     .label("monitor_name", "api")
///     .point(1_000, 85.0);
///
/// assert_eq!(series.labels.get("monitor_name").map(String::as_str), Some("api"));
/// assert_eq!(series.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSeries {
    /// Series name (e.g. `upload`, `usage`, `response_time`).
    pub name: String,

    /// Optional labels such as `interface`, `agent_id` or `monitor_name`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeMap::is_empty")
    )]
    pub labels: BTreeMap<String, String>,

    /// Samples, ordered by timestamp as returned by the backend.
    #[cfg_attr(feature = "serde", serde(default))]
    pub data: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Create an empty series with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            data: Vec::new(),
        }
    }

    /// Add a label.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Append a sample.
    pub fn point(mut self, timestamp: i64, value: f64) -> Self {
        self.data.push(MetricPoint::new(timestamp, value));
        self
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value of the first label in `keys` that is present on this series.
    pub fn first_label(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.labels.get(*k))
            .map(String::as_str)
    }
}

/// Response of `GET /agents/{id}/metrics`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MetricsResponse {
    /// Agent the metrics belong to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub agent_id: String,

    /// Metric type tag echoed by the backend.
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub metric_type: String,

    /// Range token echoed by the backend, when one was requested.
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: Option<String>,

    /// Returned series, possibly empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub series: Vec<MetricSeries>,
}

/// One per-interface throughput sample.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NetworkMetricByInterface {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    /// Interface name (e.g. `eth0`).
    pub interface: String,
    /// Upload rate in bytes per second.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sent_rate: f64,
    /// Download rate in bytes per second.
    #[cfg_attr(feature = "serde", serde(default))]
    pub recv_rate: f64,
}

/// Response of `GET /agents/{id}/metrics/network-by-interface`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NetworkByInterfaceResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub agent_id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub metric_type: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end: Option<i64>,
    /// Bucket width chosen by the backend, in seconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interval: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub metrics: Vec<NetworkMetricByInterface>,
}

impl NetworkByInterfaceResponse {
    /// Distinct interface names, sorted.
    pub fn interfaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.metrics.iter().map(|m| m.interface.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Response of `GET /monitors/{id}/history`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorHistoryResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub series: Vec<MetricSeries>,
}
