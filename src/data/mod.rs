//! Transform and formatting of fetched metrics.
//!
//! This module turns backend series into sorted, unit-converted chart rows
//! and provides the label formatters the UI draws with.
//!
//! ## Submodules
//!
//! - [`transform`]: Multi-series merge into one [`ChartRow`] per timestamp
//! - [`chart`]: [`ChartData`] with legend statistics and plot bounds
//! - [`chart_time`]: Adaptive `HH:MM` / `MM/DD HH:MM` axis labels
//! - [`format`]: Byte, rate, uptime and per-metric value formatting
//! - [`duration`]: Parsing of duration strings (e.g., "24h", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! MetricsPayload (decoded response)
//!        │
//!        ▼
//! ChartData::from_payload()
//!        │
//!        ├──▶ transform::merge_*  (scale, round, drop non-finite, sort)
//!        │
//!        └──▶ SeriesStats         (latest/min/max/avg per key)
//! ```

pub mod chart;
pub mod chart_time;
pub mod duration;
pub mod format;
pub mod transform;

pub use chart::{ChartData, SeriesStats};
pub use chart_time::{axis_labels, format_chart_time, format_chart_time_in, AxisConfig, LabelForm};
pub use format::{format_bytes, format_speed, format_uptime, format_value};
pub use transform::{
    merge_network_by_interface, merge_series, merge_series_with_keys, response_time_series,
    series_keys, ChartRow, CONNECTION_STATES,
};
