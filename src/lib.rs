//! # pikawatch
//!
//! A terminal dashboard and library for Pika Monitor agent and service metrics.
//!
//! Metrics are fetched from the backend, merged into one row per timestamp
//! with per-metric unit conversion, and drawn as line charts whose time
//! axis adapts to the window length.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(transform)    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ QueryKey                                            │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource | ChannelSource    │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Views, time window, interface selection and the per-key chart cache
//! - **[`source`]**: Data source abstraction ([`MetricsSource`] trait) with
//!   implementations for the HTTP API, JSON files and in-process channels
//! - **[`data`]**: Series merge transform, chart statistics, axis labels and formatters
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: Layered settings from file, environment and flags
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard for one agent
//! pikawatch --endpoint http://pika.local/api --token $TOKEN --agent agent-1
//!
//! # Dump merged network rows for the last 7 days and exit
//! pikawatch --agent agent-1 --metric network --range 7d --export network.json
//! ```
//!
//! ### Merging series directly
//!
//! ```
//! use pikawatch::data::merge_series;
//! use pikawatch_types::{MetricSeries, MetricType};
//!
//! let series = vec![
//!     MetricSeries::new("upload").point(1000, 1_048_576.0),
//!     MetricSeries::new("download").point(1000, 2_097_152.0),
//! ];
//! let rows = merge_series(&series, MetricType::Network);
//!
//! assert_eq!(rows[0].get("upload"), Some(1.0));
//! assert_eq!(rows[0].get("download"), Some(2.0));
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use pikawatch::{App, ChannelSource};
//! use pikawatch::data::AxisConfig;
//! use pikawatch_types::TimeWindow;
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! let app = App::new(
//!     Box::new(source),
//!     Some("agent-1".to_string()),
//!     None,
//!     TimeWindow::default(),
//!     AxisConfig::default(),
//! );
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{AxisConfig, ChartData, ChartRow, SeriesStats};
pub use source::{
    ChannelSource, FileSource, HttpSource, MetricsPayload, MetricsSource, QueryKey, SourceUpdate,
};
