//! Metric types and their unit-conversion policies.

use core::fmt;
use core::str::FromStr;
use std::borrow::Cow;

use crate::series::MetricSeries;

/// Bytes in one binary megabyte (MiB), used for throughput conversion.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Label keys that identify a response-time series per monitor or probe agent.
const RESPONSE_TIME_LABELS: &[&str] = &["monitor_name", "agent_id"];

/// Label keys that identify a temperature series per sensor.
const TEMPERATURE_LABELS: &[&str] = &["sensor"];

/// Label keys that split throughput series per device.
const NETWORK_LABELS: &[&str] = &["interface"];
const DISK_IO_LABELS: &[&str] = &["device"];

/// The kind of metric requested from the backend.
///
/// The backend dispatches on a string tag; this enum is the closed set of
/// tags the dashboard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MetricType {
    /// CPU usage percentage.
    #[default]
    Cpu,
    /// Memory usage percentage.
    Memory,
    /// Disk usage percentage.
    Disk,
    /// Network throughput (upload/download, bytes per second on the wire).
    Network,
    /// Disk IO throughput (read/write, bytes per second on the wire).
    DiskIo,
    /// GPU utilization percentage.
    Gpu,
    /// Temperature readings in degrees Celsius.
    Temperature,
    /// TCP connection counts by state.
    Connections,
    /// Service monitor response time in milliseconds.
    ResponseTime,
}

impl MetricType {
    /// All metric types, in dashboard tab order.
    pub const ALL: [MetricType; 9] = [
        MetricType::Cpu,
        MetricType::Memory,
        MetricType::Disk,
        MetricType::Network,
        MetricType::DiskIo,
        MetricType::Gpu,
        MetricType::Temperature,
        MetricType::Connections,
        MetricType::ResponseTime,
    ];

    /// The tag used in the `type` query parameter.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Cpu => "cpu",
            MetricType::Memory => "memory",
            MetricType::Disk => "disk",
            MetricType::Network => "network",
            MetricType::DiskIo => "disk_io",
            MetricType::Gpu => "gpu",
            MetricType::Temperature => "temperature",
            MetricType::Connections => "network_connection",
            MetricType::ResponseTime => "response_time",
        }
    }

    /// Human readable label for tabs and titles.
    pub const fn label(&self) -> &'static str {
        match self {
            MetricType::Cpu => "CPU",
            MetricType::Memory => "Memory",
            MetricType::Disk => "Disk",
            MetricType::Network => "Network",
            MetricType::DiskIo => "Disk IO",
            MetricType::Gpu => "GPU",
            MetricType::Temperature => "Temperature",
            MetricType::Connections => "Connections",
            MetricType::ResponseTime => "Response Time",
        }
    }

    /// Whether the `interface` filter applies to this metric.
    pub const fn is_network(&self) -> bool {
        matches!(self, MetricType::Network)
    }

    /// Whether this metric is served by the monitor history endpoint
    /// rather than the agent metrics endpoint.
    pub const fn is_monitor(&self) -> bool {
        matches!(self, MetricType::ResponseTime)
    }

    /// The fixed conversion policy for this metric.
    pub fn policy(&self) -> ConversionPolicy {
        match self {
            MetricType::Cpu | MetricType::Memory | MetricType::Disk | MetricType::Gpu => {
                ConversionPolicy::new(1.0, 2, Unit::Percent, &[])
            }
            MetricType::Network => {
                ConversionPolicy::new(1.0 / BYTES_PER_MB, 2, Unit::MegabytesPerSec, NETWORK_LABELS)
                    .qualified()
            }
            MetricType::DiskIo => {
                ConversionPolicy::new(1.0 / BYTES_PER_MB, 2, Unit::MegabytesPerSec, DISK_IO_LABELS)
                    .qualified()
            }
            MetricType::Temperature => {
                ConversionPolicy::new(1.0, 2, Unit::Celsius, TEMPERATURE_LABELS)
            }
            MetricType::Connections => ConversionPolicy::new(1.0, 0, Unit::Count, &[]),
            MetricType::ResponseTime => {
                ConversionPolicy::new(1.0, 2, Unit::Milliseconds, RESPONSE_TIME_LABELS)
            }
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ParseMetricTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MetricType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseMetricTypeError(s.to_string()))
    }
}

/// Error returned when a metric type tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMetricTypeError(pub String);

impl fmt::Display for ParseMetricTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown metric type: {}", self.0)
    }
}

impl std::error::Error for ParseMetricTypeError {}

/// Display unit of a converted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// 0-100 percent.
    Percent,
    /// Binary megabytes per second.
    MegabytesPerSec,
    /// Milliseconds.
    Milliseconds,
    /// Degrees Celsius.
    Celsius,
    /// Plain count.
    Count,
}

impl Unit {
    /// Short suffix used on axes and in legends.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::MegabytesPerSec => "MB/s",
            Unit::Milliseconds => "ms",
            Unit::Celsius => "°C",
            Unit::Count => "",
        }
    }
}

/// How raw backend values of one metric type become chart values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionPolicy {
    /// Multiplier applied to the raw value.
    pub scale: f64,
    /// Decimal places kept after scaling.
    pub precision: u32,
    /// Unit of the converted value.
    pub unit: Unit,
    /// Label keys consulted, in order, to name a series. Falls back to the
    /// series name when none are present.
    pub series_labels: &'static [&'static str],
    /// A matched label prefixes the series name (`eth0_upload`) instead of
    /// replacing it.
    pub qualify_name: bool,
}

impl ConversionPolicy {
    fn new(
        scale: f64,
        precision: u32,
        unit: Unit,
        series_labels: &'static [&'static str],
    ) -> Self {
        Self {
            scale,
            precision,
            unit,
            series_labels,
            qualify_name: false,
        }
    }

    const fn qualified(mut self) -> Self {
        self.qualify_name = true;
        self
    }

    /// Column key for `series` in merged rows.
    pub fn series_key<'a>(&self, series: &'a MetricSeries) -> Cow<'a, str> {
        match series.first_label(self.series_labels) {
            Some(label) if self.qualify_name => Cow::Owned(format!("{}_{}", label, series.name)),
            Some(label) => Cow::Borrowed(label),
            None => Cow::Borrowed(series.name.as_str()),
        }
    }

    /// Scale and round a raw value.
    pub fn apply(&self, raw: f64) -> f64 {
        round_to(raw * self.scale, self.precision)
    }
}

/// Round half away from zero to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
