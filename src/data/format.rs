//! Human readable formatting of byte counts, rates, uptimes and chart values.
//!
//! Every formatter here is total: zero, negative, missing or non-finite
//! input maps to a fixed sentinel instead of `NaN`/`inf` text.

use pikawatch_types::{MetricType, Unit, BYTES_PER_MB};

/// Storage size units, 1024-based.
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Throughput units, 1024-based.
const SPEED_UNITS: [&str; 5] = ["B/s", "K/s", "M/s", "G/s", "T/s"];

/// Scale `value` down by 1024 until it fits the largest unit available.
fn scale_binary(mut value: f64, units: usize) -> (f64, usize) {
    let mut idx = 0;
    while value >= 1024.0 && idx < units - 1 {
        value /= 1024.0;
        idx += 1;
    }
    (value, idx)
}

/// Format a byte count, e.g. `1.50 GB`.
///
/// Plain bytes are shown without decimals; larger units always carry two.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    let (value, idx) = scale_binary(bytes, SIZE_UNITS.len());
    if idx == 0 {
        format!("{:.0} B", value)
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[idx])
    }
}

/// Format a throughput in bytes per second, e.g. `12.3 M/s`.
///
/// Precision follows the scaled magnitude: none at 100 and above, one
/// decimal at 10 and above, two below that.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return "0 B/s".to_string();
    }

    let (value, idx) = scale_binary(bytes_per_sec, SPEED_UNITS.len());
    let unit = SPEED_UNITS[idx];
    if value >= 100.0 {
        format!("{:.0} {}", value, unit)
    } else if value >= 10.0 {
        format!("{:.1} {}", value, unit)
    } else {
        format!("{:.2} {}", value, unit)
    }
}

/// Format an uptime given in seconds, e.g. `3d 4h 5m`.
///
/// `None` renders as `-`.
pub fn format_uptime(seconds: Option<u64>) -> String {
    let Some(secs) = seconds else {
        return "-".to_string();
    };

    if secs < 60 {
        return format!("{}s", secs);
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{}h", hours));
    }
    parts.push(format!("{}m", minutes));
    parts.join(" ")
}

/// Format a 0-100 percentage, e.g. `42.13%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{:.2}%", value)
}

/// Format a latency in milliseconds, switching to seconds at 1000 ms.
pub fn format_latency_ms(ms: f64) -> String {
    if !ms.is_finite() || ms < 0.0 {
        return "-".to_string();
    }
    if ms < 1_000.0 {
        format!("{:.0} ms", ms)
    } else {
        format!("{:.2} s", ms / 1_000.0)
    }
}

/// Format large numbers with K/M suffixes
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format an already-converted chart value in the display unit of its metric.
pub fn format_value(metric_type: MetricType, value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    match metric_type.policy().unit {
        Unit::Percent => format_percent(value),
        Unit::MegabytesPerSec => format_speed(value * BYTES_PER_MB),
        Unit::Milliseconds => format_latency_ms(value),
        Unit::Celsius => format!("{:.1}°C", value),
        Unit::Count if value < 0.0 => "-".to_string(),
        Unit::Count => format_count(value.round() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_sentinels() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(-10.0), "0 B");
        assert_eq!(format_bytes(f64::NAN), "0 B");
        assert_eq!(format_bytes(f64::INFINITY), "0 B");
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1024.0), "1.00 KB");
        assert_eq!(format_bytes(1_572_864.0), "1.50 MB");
        assert_eq!(format_bytes(1_610_612_736.0), "1.50 GB");
        assert_eq!(format_bytes(5.0 * 1024f64.powi(4)), "5.00 TB");
    }

    #[test]
    fn test_format_bytes_caps_at_terabytes() {
        assert_eq!(format_bytes(2048.0 * 1024f64.powi(4)), "2048.00 TB");
    }

    #[test]
    fn test_format_speed_sentinels() {
        assert_eq!(format_speed(0.0), "0 B/s");
        assert_eq!(format_speed(-5.0), "0 B/s");
        assert_eq!(format_speed(f64::NAN), "0 B/s");
    }

    #[test]
    fn test_format_speed_precision_by_magnitude() {
        assert_eq!(format_speed(500.0), "500 B/s");
        assert_eq!(format_speed(50.0), "50.0 B/s");
        assert_eq!(format_speed(5.0), "5.00 B/s");
        assert_eq!(format_speed(1536.0), "1.50 K/s");
        assert_eq!(format_speed(12.5 * 1_048_576.0), "12.5 M/s");
        assert_eq!(format_speed(250.0 * 1_073_741_824.0), "250 G/s");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(None), "-");
        assert_eq!(format_uptime(Some(0)), "0s");
        assert_eq!(format_uptime(Some(42)), "42s");
        assert_eq!(format_uptime(Some(3_600)), "1h 0m");
        assert_eq!(format_uptime(Some(90_061)), "1d 1h 1m");
        assert_eq!(format_uptime(Some(86_400)), "1d 0h 0m");
        assert_eq!(format_uptime(Some(125)), "2m");
    }

    #[test]
    fn test_format_percent_and_latency() {
        assert_eq!(format_percent(42.126), "42.13%");
        assert_eq!(format_percent(f64::NAN), "-");
        assert_eq!(format_latency_ms(85.4), "85 ms");
        assert_eq!(format_latency_ms(1_250.0), "1.25 s");
        assert_eq!(format_latency_ms(-1.0), "-");
    }

    #[test]
    fn test_format_value_dispatches_on_unit() {
        assert_eq!(format_value(MetricType::Cpu, 12.5), "12.50%");
        assert_eq!(format_value(MetricType::Network, 1.5), "1.50 M/s");
        assert_eq!(format_value(MetricType::ResponseTime, 300.0), "300 ms");
        assert_eq!(format_value(MetricType::Temperature, 54.26), "54.3°C");
        assert_eq!(format_value(MetricType::Connections, 1_500.0), "1.5K");
        assert_eq!(format_value(MetricType::Connections, f64::INFINITY), "-");
    }
}
