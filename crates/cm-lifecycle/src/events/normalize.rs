//! Wire-event normalization.
//!
//! Network watchers emit flat JSON records whose field names have drifted
//! across watcher versions. This module accepts every historical shape
//! (serde aliases) and produces the canonical [`ObservationEvent`], with
//! identifier strings parsed and validated up front so the engine core never
//! sees malformed input.

use crate::domain::errors::{LifecycleError, LifecycleResult};
use crate::domain::value_objects::ParticipationKind;
use crate::events::incoming::ObservationEvent;
use serde::Deserialize;
use shared_types::{parse_adapter, parse_bytes, parse_hash, EventMeta, NetworkId};

/// Flat wire record as emitted by the watchers. Optional fields are
/// validated per event name during normalization.
#[derive(Debug, Deserialize)]
pub struct WireEvent {
    /// Event name, snake_case.
    #[serde(alias = "type", alias = "kind")]
    pub event: String,
    /// Source network id.
    #[serde(default, alias = "src", alias = "source_chain", alias = "srcChainId")]
    pub source_network: Option<u64>,
    /// Destination network id.
    #[serde(default, alias = "dst", alias = "dest_chain", alias = "dstChainId")]
    pub dest_network: Option<u64>,
    /// Hex-encoded raw bytes (single message or whole batch).
    #[serde(default, alias = "payload", alias = "raw")]
    pub data: Option<String>,
    /// Hex-encoded content-addressed payload id.
    #[serde(default)]
    pub payload_id: Option<String>,
    /// Hex-encoded content-addressed message id.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Hex-encoded bare content hash (recovery events).
    #[serde(default, alias = "batch_hash")]
    pub payload_hash: Option<String>,
    /// Hex-encoded adapter address.
    #[serde(default, alias = "dvn", alias = "relayer")]
    pub adapter: Option<String>,
    /// `"payload"` or `"proof"`.
    #[serde(default, alias = "role")]
    pub adapter_kind: Option<String>,
    /// Block the emission landed in.
    #[serde(alias = "block")]
    pub block_number: u64,
    /// Block timestamp, seconds.
    #[serde(alias = "block_timestamp")]
    pub timestamp: u64,
    /// Hex-encoded transaction hash.
    #[serde(alias = "tx")]
    pub tx_hash: String,
    /// Log index within the transaction.
    #[serde(default)]
    pub log_index: u32,
}

fn malformed(reason: impl Into<String>) -> LifecycleError {
    LifecycleError::MalformedEvent {
        reason: reason.into(),
    }
}

impl WireEvent {
    fn meta(&self) -> LifecycleResult<EventMeta> {
        Ok(EventMeta {
            block_number: self.block_number,
            timestamp: self.timestamp,
            tx_hash: parse_hash(&self.tx_hash).map_err(|e| malformed(format!("tx_hash: {e}")))?,
            log_index: self.log_index,
        })
    }

    fn source(&self) -> LifecycleResult<NetworkId> {
        self.source_network
            .map(NetworkId)
            .ok_or_else(|| malformed("missing source_network"))
    }

    fn dest(&self) -> LifecycleResult<NetworkId> {
        self.dest_network
            .map(NetworkId)
            .ok_or_else(|| malformed("missing dest_network"))
    }

    fn data_bytes(&self) -> LifecycleResult<Vec<u8>> {
        let s = self.data.as_deref().ok_or_else(|| malformed("missing data"))?;
        parse_bytes(s).map_err(|e| malformed(format!("data: {e}")))
    }

    fn hash_field(
        &self,
        value: &Option<String>,
        name: &str,
    ) -> LifecycleResult<shared_types::Hash> {
        let s = value.as_deref().ok_or_else(|| malformed(format!("missing {name}")))?;
        parse_hash(s).map_err(|e| malformed(format!("{name}: {e}")))
    }

    fn adapter_id(&self) -> LifecycleResult<shared_types::AdapterId> {
        let s = self
            .adapter
            .as_deref()
            .ok_or_else(|| malformed("missing adapter"))?;
        parse_adapter(s).map_err(|e| malformed(format!("adapter: {e}")))
    }

    fn participation_kind(&self) -> LifecycleResult<ParticipationKind> {
        match self.adapter_kind.as_deref() {
            Some("payload") => Ok(ParticipationKind::Payload),
            Some("proof") => Ok(ParticipationKind::Proof),
            Some(other) => Err(malformed(format!("unknown adapter_kind: {other}"))),
            None => Err(malformed("missing adapter_kind")),
        }
    }
}

/// Parse and validate one wire record into a canonical event.
pub fn normalize_event(raw: &str) -> LifecycleResult<ObservationEvent> {
    let wire: WireEvent =
        serde_json::from_str(raw).map_err(|e| malformed(format!("invalid json: {e}")))?;
    let meta = wire.meta()?;

    match wire.event.as_str() {
        "message_prepared" => Ok(ObservationEvent::MessagePrepared {
            source: wire.source()?,
            dest: wire.dest()?,
            raw_message: wire.data_bytes()?,
            meta,
        }),
        "batch_sent" => Ok(ObservationEvent::BatchSent {
            source: wire.source()?,
            dest: wire.dest()?,
            raw_batch: wire.data_bytes()?,
            adapter: wire.adapter_id()?,
            kind: wire.participation_kind()?,
            meta,
        }),
        "batch_underpaid" => Ok(ObservationEvent::BatchUnderpaid {
            source: wire.source()?,
            dest: wire.dest()?,
            raw_batch: wire.data_bytes()?,
            meta,
        }),
        "batch_repaid" => Ok(ObservationEvent::BatchRepaid {
            source: wire.source()?,
            dest: wire.dest()?,
            payload_id: wire.hash_field(&wire.payload_id, "payload_id")?,
            meta,
        }),
        "batch_handled" => Ok(ObservationEvent::BatchHandled {
            source: wire.source()?,
            dest: wire.dest()?,
            payload_id: wire.hash_field(&wire.payload_id, "payload_id")?,
            adapter: wire.adapter_id()?,
            kind: wire.participation_kind()?,
            meta,
        }),
        "message_executed" => Ok(ObservationEvent::MessageExecuted {
            dest: wire.dest()?,
            message_id: wire.hash_field(&wire.message_id, "message_id")?,
            payload_id: wire.hash_field(&wire.payload_id, "payload_id")?,
            meta,
        }),
        "message_failed" => Ok(ObservationEvent::MessageFailed {
            dest: wire.dest()?,
            message_id: wire.hash_field(&wire.message_id, "message_id")?,
            payload_id: wire.hash_field(&wire.payload_id, "payload_id")?,
            meta,
        }),
        "recovery_initiated" => Ok(ObservationEvent::RecoveryInitiated {
            dest: wire.dest()?,
            adapter: wire.adapter_id()?,
            payload_hash: wire.hash_field(&wire.payload_hash, "payload_hash")?,
            meta,
        }),
        "recovery_disputed" => Ok(ObservationEvent::RecoveryDisputed {
            dest: wire.dest()?,
            adapter: wire.adapter_id()?,
            payload_hash: wire.hash_field(&wire.payload_hash, "payload_hash")?,
            meta,
        }),
        "recovery_executed" => Ok(ObservationEvent::RecoveryExecuted {
            dest: wire.dest()?,
            adapter: wire.adapter_id()?,
            payload_hash: wire.hash_field(&wire.payload_hash, "payload_hash")?,
            meta,
        }),
        other => Err(malformed(format!("unknown event: {other}"))),
    }
}
