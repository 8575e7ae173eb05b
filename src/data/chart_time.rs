//! Adaptive time-axis labels.
//!
//! Charts spanning more than a day need the date on every tick, shorter
//! windows only need the time of day. The switch-over point is an
//! [`AxisConfig`] value rather than a literal.

use std::time::Duration;

use chrono::{Local, TimeZone};
use pikawatch_types::TimeWindow;

use super::transform::ChartRow;

const SHORT_FORMAT: &str = "%H:%M";
const LONG_FORMAT: &str = "%m/%d %H:%M";

/// Time-axis settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConfig {
    /// Windows at least this long get dated labels, whether given as a
    /// range token or as explicit bounds.
    pub long_form_after: Duration,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            long_form_after: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl AxisConfig {
    fn threshold_ms(&self) -> i64 {
        i64::try_from(self.long_form_after.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Shape of an axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelForm {
    /// `HH:MM`
    Short,
    /// `MM/DD HH:MM`
    Long,
}

/// Pick the label shape for a window.
///
/// The span is the token's duration or `end - start`. A span of exactly the
/// threshold (`1d`, `24h`, or a 24 h explicit window) is already long.
pub fn label_form(window: &TimeWindow, cfg: &AxisConfig) -> LabelForm {
    if window.span_ms() >= cfg.threshold_ms() {
        LabelForm::Long
    } else {
        LabelForm::Short
    }
}

/// Format an epoch-millisecond timestamp in `tz` for the given window.
///
/// Returns `"-"` when the timestamp is outside the range chrono can represent.
pub fn format_chart_time_in<Tz>(tz: &Tz, ts_ms: i64, window: &TimeWindow, cfg: &AxisConfig) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(dt) = tz.timestamp_millis_opt(ts_ms).single() else {
        return "-".to_string();
    };
    let fmt = match label_form(window, cfg) {
        LabelForm::Short => SHORT_FORMAT,
        LabelForm::Long => LONG_FORMAT,
    };
    dt.format(fmt).to_string()
}

/// Format a timestamp in the local timezone.
pub fn format_chart_time(ts_ms: i64, window: &TimeWindow, cfg: &AxisConfig) -> String {
    format_chart_time_in(&Local, ts_ms, window, cfg)
}

/// `n` evenly spaced labels between the first and last row, in `tz`.
pub fn axis_labels_in<Tz>(
    tz: &Tz,
    rows: &[ChartRow],
    window: &TimeWindow,
    cfg: &AxisConfig,
    n: usize,
) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Vec::new();
    };
    let (min, max) = (first.timestamp, last.timestamp);

    if n <= 1 || min == max {
        return vec![format_chart_time_in(tz, min, window, cfg)];
    }

    let step = (max - min) as f64 / (n - 1) as f64;
    (0..n)
        .map(|i| {
            let ts = min + (step * i as f64).round() as i64;
            format_chart_time_in(tz, ts, window, cfg)
        })
        .collect()
}

/// [`axis_labels_in`] using local time.
pub fn axis_labels(rows: &[ChartRow], window: &TimeWindow, cfg: &AxisConfig, n: usize) -> Vec<String> {
    axis_labels_in(&Local, rows, window, cfg, n)
}
