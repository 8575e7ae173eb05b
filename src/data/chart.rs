//! Chart-ready data built from a fetched payload.

use std::time::Instant;

use pikawatch_types::{MetricType, TimeWindow};
use serde::Serialize;

use super::transform::{
    merge_network_by_interface, merge_series, merge_series_with_keys, response_time_series,
    series_keys, ChartRow, CONNECTION_STATES,
};
use crate::source::MetricsPayload;

/// Summary statistics of one series over the window, for the legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub key: String,
    pub latest: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl SeriesStats {
    /// Compute stats for `key`, or `None` if no row carries it.
    pub fn compute(rows: &[ChartRow], key: &str) -> Option<Self> {
        let mut values = rows.iter().filter_map(|r| r.get(key));
        let first = values.next()?;

        let (mut latest, mut min, mut max, mut sum, mut count) = (first, first, first, first, 1usize);
        for v in values {
            latest = v;
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        Some(Self {
            key: key.to_string(),
            latest,
            min,
            max,
            avg: sum / count as f64,
        })
    }
}

/// Merged rows plus everything the chart and legend derive from them.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub metric_type: MetricType,
    pub window: TimeWindow,
    pub rows: Vec<ChartRow>,
    pub keys: Vec<String>,
    pub stats: Vec<SeriesStats>,
    pub interfaces: Vec<String>,
    pub last_updated: Instant,
}

impl ChartData {
    /// Run the merge transform matching the payload and metric type.
    pub fn from_payload(payload: &MetricsPayload, metric_type: MetricType, window: TimeWindow) -> Self {
        let rows = match payload {
            MetricsPayload::Interfaces(resp) => merge_network_by_interface(&resp.metrics),
            MetricsPayload::Series(series) => match metric_type {
                MetricType::Connections => {
                    merge_series_with_keys(series, metric_type, &CONNECTION_STATES)
                }
                MetricType::ResponseTime => response_time_series(series),
                _ => merge_series(series, metric_type),
            },
        };
        Self::from_rows(rows, metric_type, window, payload.interfaces())
    }

    /// Wrap already merged rows.
    pub fn from_rows(
        rows: Vec<ChartRow>,
        metric_type: MetricType,
        window: TimeWindow,
        interfaces: Vec<String>,
    ) -> Self {
        let keys = series_keys(&rows);
        let stats = keys
            .iter()
            .filter_map(|k| SeriesStats::compute(&rows, k))
            .collect();

        Self {
            metric_type,
            window,
            rows,
            keys,
            stats,
            interfaces,
            last_updated: Instant::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First and last timestamp, i.e. the x domain `[dataMin, dataMax]`.
    pub fn time_bounds(&self) -> Option<(i64, i64)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }

    /// Y domain covering every value with 10% headroom, floored at zero
    /// for non-negative data.
    pub fn value_bounds(&self) -> (f64, f64) {
        let (min, max) = self
            .stats
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.min), hi.max(s.max))
            });

        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }

        let span = (max - min).max(max.abs()).max(1.0);
        let pad = span * 0.1;
        let lo = if min >= 0.0 { 0.0 } else { min - pad };
        (lo, max + pad)
    }

    /// `(timestamp, value)` pairs of one series, for a ratatui dataset.
    pub fn points(&self, key: &str) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.get(key).map(|v| (r.timestamp as f64, v)))
            .collect()
    }

    /// How long ago this data was built.
    pub fn age(&self) -> std::time::Duration {
        self.last_updated.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pikawatch_types::{MetricSeries, NetworkByInterfaceResponse, NetworkMetricByInterface, RangeToken};

    fn window() -> TimeWindow {
        TimeWindow::Range(RangeToken::H1)
    }

    #[test]
    fn test_series_stats() {
        let series = vec![MetricSeries::new("usage")
            .point(1000, 10.0)
            .point(2000, 30.0)
            .point(3000, 20.0)];
        let data = ChartData::from_payload(&MetricsPayload::Series(series), MetricType::Cpu, window());

        assert_eq!(data.keys, vec!["usage"]);
        let stats = &data.stats[0];
        assert_eq!(stats.latest, 20.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.avg, 20.0);
    }

    #[test]
    fn test_empty_payload() {
        let data = ChartData::from_payload(&MetricsPayload::Series(Vec::new()), MetricType::Cpu, window());
        assert!(data.is_empty());
        assert!(data.stats.is_empty());
        assert_eq!(data.time_bounds(), None);
        assert_eq!(data.value_bounds(), (0.0, 1.0));
    }

    #[test]
    fn test_connections_seeded() {
        let series = vec![MetricSeries::new("listen").point(1000, 4.0)];
        let data = ChartData::from_payload(
            &MetricsPayload::Series(series),
            MetricType::Connections,
            window(),
        );
        assert_eq!(data.keys.len(), CONNECTION_STATES.len());
        assert_eq!(data.rows[0].get("established"), Some(0.0));
    }

    #[test]
    fn test_interfaces_payload() {
        let resp = NetworkByInterfaceResponse {
            metrics: vec![NetworkMetricByInterface {
                timestamp: 1000,
                interface: "eth0".to_string(),
                sent_rate: 1_048_576.0,
                recv_rate: 2_097_152.0,
            }],
            ..Default::default()
        };
        let data = ChartData::from_payload(&MetricsPayload::Interfaces(resp), MetricType::Network, window());

        assert_eq!(data.interfaces, vec!["eth0"]);
        assert_eq!(data.points("eth0_upload"), vec![(1000.0, 1.0)]);
        assert_eq!(data.points("eth0_download"), vec![(1000.0, 2.0)]);
    }

    #[test]
    fn test_bounds() {
        let series = vec![MetricSeries::new("usage").point(1000, 10.0).point(5000, 50.0)];
        let data = ChartData::from_payload(&MetricsPayload::Series(series), MetricType::Cpu, window());

        assert_eq!(data.time_bounds(), Some((1000, 5000)));
        let (lo, hi) = data.value_bounds();
        assert_eq!(lo, 0.0);
        assert!(hi > 50.0);
    }

    #[test]
    fn test_negative_values_padded_below() {
        let rows = vec![ChartRow {
            timestamp: 1,
            values: [("delta".to_string(), -5.0)].into_iter().collect(),
        }];
        let data = ChartData::from_rows(rows, MetricType::Temperature, window(), Vec::new());
        let (lo, hi) = data.value_bounds();
        assert!(lo < -5.0);
        assert!(hi > -5.0);
    }
}
