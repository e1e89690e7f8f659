//! # CrossMesh Telemetry
//!
//! Observability for the CrossMesh lifecycle engine.
//!
//! ## Components
//!
//! - Structured logging via `tracing` / `tracing-subscriber`
//! - Prometheus metrics for engine throughput
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crossmesh_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Engine code here; logs and metrics are now being collected.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CM_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CM_JSON_LOGS` | `false` | JSON formatted logs |
//! | `CM_METRICS_PORT` | `9400` | Prometheus scrape port |
//! | `CM_SERVICE_NAME` | `crossmesh-lifecycle` | Service name |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, BATCH_DECODE_FAILURES, MESSAGES_EXECUTED, MESSAGES_FAILED,
    MESSAGES_OBSERVED, PARTICIPATIONS_RECORDED, PAYLOADS_COMPLETED, PAYLOADS_DELIVERED,
    PAYLOADS_OBSERVED, PAYLOADS_PARTIALLY_FAILED, QUORUM_CONFIRMATIONS, RECOVERIES_DISPUTED,
    RECOVERIES_EXECUTED, RECOVERIES_INITIATED, REGISTRY,
};
pub use tracing_setup::init_telemetry;

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Subscriber installation failed (usually: installed twice).
    #[error("Tracing init failed: {0}")]
    TracingInit(String),

    /// Metrics registration or encoding failed.
    #[error("Metrics error: {0}")]
    Metrics(String),
}
