//! # pikawatch-client
//!
//! Fetch layer for the Pika Monitor metrics API.
//!
//! This crate turns an entity id, a metric type and a time window into a
//! request against the backend and decodes the response into
//! [`pikawatch_types`] values. It owns three concerns:
//!
//! - **Query construction** ([`MetricsQuery`]): exactly one time window per
//!   request, explicit bounds win over a range token, and the `interface`
//!   filter only accompanies network metrics
//! - **Session context** ([`Session`]): the API token is an explicit, shared
//!   handle rather than global state, cleared when the backend returns 401
//! - **Transport** ([`PikaClient`]): async `reqwest` client with status-code
//!   to [`ClientError`] mapping
//!
//! Caching and request de-duplication are left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pikawatch_client::{MetricsQuery, PikaClient};
//! use pikawatch_types::{MetricType, RangeToken};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PikaClient::builder()
//!         .endpoint("http://localhost:8080/api")
//!         .token("my-api-token")
//!         .build()?;
//!
//!     let query = MetricsQuery::builder("agent-1", MetricType::Cpu)
//!         .range(RangeToken::H1)
//!         .build()?;
//!
//!     let response = client.metrics(&query).await?;
//!     println!("Fetched {} series", response.series.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod query;
pub mod session;

pub use client::{PikaClient, PikaClientBuilder};
pub use error::ClientError;
pub use query::{Endpoint, MetricsQuery, MetricsQueryBuilder};
pub use session::Session;

// Re-export types for convenience
pub use pikawatch_types::{
    MetricSeries, MetricType, MetricsResponse, MonitorHistoryResponse, NetworkByInterfaceResponse,
    RangeToken, TimeWindow,
};
