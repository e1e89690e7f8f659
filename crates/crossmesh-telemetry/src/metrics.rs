//! Prometheus metrics for the lifecycle engine.
//!
//! All metrics follow the naming convention: `cm_<component>_<metric>_<unit>`.
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., payloads_completed_total)
//! - **CounterVec**: Counter partitioned by label (e.g., per destination network)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry.
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MESSAGE LIFECYCLE
    // =========================================================================

    /// Messages first observed being prepared on a source network.
    pub static ref MESSAGES_OBSERVED: Counter = Counter::new(
        "cm_lifecycle_messages_observed_total",
        "Total messages observed in prepared state"
    ).expect("metric creation failed");

    /// Messages that reached the Executed terminal state.
    pub static ref MESSAGES_EXECUTED: Counter = Counter::new(
        "cm_lifecycle_messages_executed_total",
        "Total messages marked executed on their destination network"
    ).expect("metric creation failed");

    /// Messages that reached the Failed terminal state.
    pub static ref MESSAGES_FAILED: Counter = Counter::new(
        "cm_lifecycle_messages_failed_total",
        "Total messages marked failed on their destination network"
    ).expect("metric creation failed");

    // =========================================================================
    // PAYLOAD LIFECYCLE
    // =========================================================================

    /// Payload instances created (sent or underpaid).
    pub static ref PAYLOADS_OBSERVED: Counter = Counter::new(
        "cm_lifecycle_payloads_observed_total",
        "Total payload instances created from send observations"
    ).expect("metric creation failed");

    /// Payload instances delivered on their destination network.
    pub static ref PAYLOADS_DELIVERED: Counter = Counter::new(
        "cm_lifecycle_payloads_delivered_total",
        "Total payload instances delivered"
    ).expect("metric creation failed");

    /// Payload instances completed, labeled by completion path.
    pub static ref PAYLOADS_COMPLETED: CounterVec = CounterVec::new(
        Opts::new(
            "cm_lifecycle_payloads_completed_total",
            "Total payload instances completed"
        ),
        &["path"] // path: quorum | recovery
    ).expect("metric creation failed");

    /// Payload instances completed with at least one failed message.
    pub static ref PAYLOADS_PARTIALLY_FAILED: Counter = Counter::new(
        "cm_lifecycle_payloads_partially_failed_total",
        "Total payload instances that completed partially failed"
    ).expect("metric creation failed");

    // =========================================================================
    // QUORUM & PARTICIPATION
    // =========================================================================

    /// Adapter participation rows recorded.
    pub static ref PARTICIPATIONS_RECORDED: Counter = Counter::new(
        "cm_quorum_participations_recorded_total",
        "Total adapter participation observations recorded"
    ).expect("metric creation failed");

    /// Quorum confirmations reached.
    pub static ref QUORUM_CONFIRMATIONS: Counter = Counter::new(
        "cm_quorum_confirmations_total",
        "Total payload instances that reached adapter quorum"
    ).expect("metric creation failed");

    // =========================================================================
    // CODEC
    // =========================================================================

    /// Batches whose decoding stopped early.
    pub static ref BATCH_DECODE_FAILURES: CounterVec = CounterVec::new(
        Opts::new(
            "cm_codec_batch_decode_failures_total",
            "Total batches that could not be fully decoded"
        ),
        &["reason"] // reason: unknown_kind | truncated
    ).expect("metric creation failed");

    // =========================================================================
    // RECOVERY
    // =========================================================================

    /// Recovery attempts initiated.
    pub static ref RECOVERIES_INITIATED: Counter = Counter::new(
        "cm_recovery_initiated_total",
        "Total recovery attempts initiated"
    ).expect("metric creation failed");

    /// Recovery attempts disputed before the challenge period elapsed.
    pub static ref RECOVERIES_DISPUTED: Counter = Counter::new(
        "cm_recovery_disputed_total",
        "Total recovery attempts cancelled by dispute"
    ).expect("metric creation failed");

    /// Recovery attempts executed (quorum bypassed).
    pub static ref RECOVERIES_EXECUTED: Counter = Counter::new(
        "cm_recovery_executed_total",
        "Total recovery attempts that force-delivered a payload"
    ).expect("metric creation failed");
}

/// Register all engine metrics with the global registry.
///
/// Idempotent in practice: a second registration of the same collector is
/// reported by prometheus and surfaced as `TelemetryError::Metrics`.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_OBSERVED.clone()),
        Box::new(MESSAGES_EXECUTED.clone()),
        Box::new(MESSAGES_FAILED.clone()),
        Box::new(PAYLOADS_OBSERVED.clone()),
        Box::new(PAYLOADS_DELIVERED.clone()),
        Box::new(PAYLOADS_COMPLETED.clone()),
        Box::new(PAYLOADS_PARTIALLY_FAILED.clone()),
        Box::new(PARTICIPATIONS_RECORDED.clone()),
        Box::new(QUORUM_CONFIRMATIONS.clone()),
        Box::new(BATCH_DECODE_FAILURES.clone()),
        Box::new(RECOVERIES_INITIATED.clone()),
        Box::new(RECOVERIES_DISPUTED.clone()),
        Box::new(RECOVERIES_EXECUTED.clone()),
    ];

    for collector in collectors {
        REGISTRY
            .register(collector)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    }
    Ok(())
}

/// Encode the current registry contents in Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}
