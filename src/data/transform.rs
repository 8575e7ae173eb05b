//! Series merge: N named series in, one row per timestamp out.
//!
//! Rows live in a `BTreeMap` keyed by timestamp, so the output is always
//! sorted ascending. Input series are only borrowed.

use std::collections::{BTreeMap, BTreeSet};

use pikawatch_types::{
    round_to, ConversionPolicy, MetricSeries, MetricType, NetworkMetricByInterface, BYTES_PER_MB,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Connection states reported by agents, in legend order.
pub const CONNECTION_STATES: [&str; 11] = [
    "established",
    "syn_sent",
    "syn_recv",
    "fin_wait1",
    "fin_wait2",
    "time_wait",
    "close",
    "close_wait",
    "last_ack",
    "listen",
    "closing",
];

/// Name of the monitor history series holding latency samples.
pub const RESPONSE_TIME_SERIES: &str = "response_time";

/// Row field that value keys flatten next to.
const TIMESTAMP_FIELD: &str = "timestamp";

/// Value key used for a series that would collide with [`TIMESTAMP_FIELD`].
pub const RENAMED_TIMESTAMP_KEY: &str = "timestamp_value";

/// One merged chart row.
///
/// Serializes flat: `{"timestamp":1000,"upload":1.0,"download":2.0}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartRow {
    pub timestamp: i64,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartRow {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Insert one converted value, dropping anything non-finite.
///
/// A key equal to the row's own `timestamp` field is stored as
/// [`RENAMED_TIMESTAMP_KEY`] so flat JSON keeps unique keys.
fn insert_value(
    rows: &mut BTreeMap<i64, ChartRow>,
    key: &str,
    timestamp: i64,
    value: f64,
    seed: &[&str],
) {
    if !value.is_finite() {
        warn!(series = key, timestamp, "dropping non-finite point");
        return;
    }

    let key = if key == TIMESTAMP_FIELD {
        warn!(series = key, renamed = RENAMED_TIMESTAMP_KEY, "series key clashes with row field");
        RENAMED_TIMESTAMP_KEY
    } else {
        key
    };

    let row = rows.entry(timestamp).or_insert_with(|| {
        let mut row = ChartRow::new(timestamp);
        for k in seed {
            row.values.insert((*k).to_string(), 0.0);
        }
        row
    });
    row.values.insert(key.to_string(), value);
}

fn merge_with_policy<'a, I>(series: I, policy: &ConversionPolicy, seed: &[&str]) -> Vec<ChartRow>
where
    I: IntoIterator<Item = &'a MetricSeries>,
{
    let mut rows: BTreeMap<i64, ChartRow> = BTreeMap::new();

    for s in series {
        let key = policy.series_key(s);
        for point in &s.data {
            // NaN survives scaling, infinities may not
            let value = if point.value.is_finite() {
                policy.apply(point.value)
            } else {
                point.value
            };
            insert_value(&mut rows, &key, point.timestamp, value, seed);
        }
    }

    rows.into_values().collect()
}

/// Merge series of one metric type into sorted chart rows.
///
/// Values are scaled and rounded by the metric's conversion policy. Series
/// are keyed by the first policy label present (prefixed to the name for
/// throughput, e.g. `eth0_upload`), else by name. Later series win when two
/// map to the same key and timestamp.
pub fn merge_series(series: &[MetricSeries], metric_type: MetricType) -> Vec<ChartRow> {
    merge_with_policy(series, &metric_type.policy(), &[])
}

/// Like [`merge_series`], but every row starts with `known_keys` set to 0.
pub fn merge_series_with_keys(
    series: &[MetricSeries],
    metric_type: MetricType,
    known_keys: &[&str],
) -> Vec<ChartRow> {
    merge_with_policy(series, &metric_type.policy(), known_keys)
}

/// Merge per-interface throughput into `{iface}_upload` / `{iface}_download`
/// columns, in MB/s.
pub fn merge_network_by_interface(metrics: &[NetworkMetricByInterface]) -> Vec<ChartRow> {
    let mut rows: BTreeMap<i64, ChartRow> = BTreeMap::new();

    for m in metrics {
        let upload = format!("{}_upload", m.interface);
        let download = format!("{}_download", m.interface);
        insert_value(&mut rows, &upload, m.timestamp, to_mb(m.sent_rate), &[]);
        insert_value(&mut rows, &download, m.timestamp, to_mb(m.recv_rate), &[]);
    }

    rows.into_values().collect()
}

fn to_mb(bytes_per_sec: f64) -> f64 {
    if bytes_per_sec.is_finite() {
        round_to(bytes_per_sec / BYTES_PER_MB, 2)
    } else {
        bytes_per_sec
    }
}

/// Merge only the `response_time` series of a monitor history.
pub fn response_time_series(series: &[MetricSeries]) -> Vec<ChartRow> {
    merge_with_policy(
        series.iter().filter(|s| s.name == RESPONSE_TIME_SERIES),
        &MetricType::ResponseTime.policy(),
        &[],
    )
}

/// Distinct value keys across rows, sorted.
pub fn series_keys(rows: &[ChartRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| r.values.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
