//! # pikawatch-types
//!
//! Core types for the Pika Monitor metrics API. This crate defines the shapes
//! the backend returns for agent metrics and monitor history, together with
//! the metric-type and time-window vocabulary used to query them.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to (de)serialize API payloads
//! - **Exhaustive metric policies**: Every [`MetricType`] maps to exactly one
//!   [`ConversionPolicy`] through a `match`, so adding a metric type is a compile error
//!   until its scale and precision are decided
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization of API payloads via serde
//!
//! ## Example
//!
//! ```rust
//! use pikawatch_types::{MetricSeries, MetricType, RangeToken, TimeWindow};
//!
//! let upload = MetricSeries::new("upload")
//!     .point(1_000, 1_048_576.0)
//!     .point(2_000, 2_097_152.0);
//!
//! let policy = MetricType::Network.policy();
//! assert_eq!(policy.apply(upload.data[0].value), 1.0);
//!
//! let window = TimeWindow::Range(RangeToken::H1);
//! assert_eq!(window.span_ms(), 3_600_000);
//! ```

mod metric;
mod series;
mod window;

pub use metric::*;
pub use series::*;
pub use window::*;
