//! Canonical observation events.
//!
//! One variant per on-network emission the watchers monitor. Events arrive
//! at-least-once and without cross-network ordering; every variant carries
//! the `EventMeta` of its emission so the engine can absorb replays.

use crate::domain::value_objects::ParticipationKind;
use serde::{Deserialize, Serialize};
use shared_types::{AdapterId, EventMeta, Hash, NetworkId};

/// A single observed on-network emission, already normalized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ObservationEvent {
    /// A message was prepared on its source network, before batching.
    MessagePrepared {
        /// Emitting network.
        source: NetworkId,
        /// Target network.
        dest: NetworkId,
        /// Full wire bytes of the message (discriminator + body).
        raw_message: Vec<u8>,
        /// Emission point.
        meta: EventMeta,
    },
    /// A batch left the source network with a sufficient fee.
    BatchSent {
        /// Emitting network.
        source: NetworkId,
        /// Target network.
        dest: NetworkId,
        /// Raw batch bytes (concatenated messages).
        raw_batch: Vec<u8>,
        /// Adapter observed carrying the batch.
        adapter: AdapterId,
        /// Whether the adapter carried the payload or a proof.
        kind: ParticipationKind,
        /// Emission point.
        meta: EventMeta,
    },
    /// A batch left the source network with an insufficient fee.
    BatchUnderpaid {
        /// Emitting network.
        source: NetworkId,
        /// Target network.
        dest: NetworkId,
        /// Raw batch bytes.
        raw_batch: Vec<u8>,
        /// Emission point.
        meta: EventMeta,
    },
    /// The fee for an underpaid batch was topped up on the source network.
    BatchRepaid {
        /// Emitting network.
        source: NetworkId,
        /// Target network.
        dest: NetworkId,
        /// Content-addressed payload id.
        payload_id: Hash,
        /// Emission point.
        meta: EventMeta,
    },
    /// An adapter handled a batch (payload or proof) on the destination
    /// network.
    BatchHandled {
        /// Source network of the transfer.
        source: NetworkId,
        /// Emitting (destination) network.
        dest: NetworkId,
        /// Content-addressed payload id.
        payload_id: Hash,
        /// Adapter observed handling.
        adapter: AdapterId,
        /// Whether the adapter carried the payload or a proof.
        kind: ParticipationKind,
        /// Emission point.
        meta: EventMeta,
    },
    /// A message inside a delivered batch executed successfully.
    MessageExecuted {
        /// Emitting (destination) network.
        dest: NetworkId,
        /// Content-addressed message id.
        message_id: Hash,
        /// Containing payload id.
        payload_id: Hash,
        /// Emission point.
        meta: EventMeta,
    },
    /// A message inside a delivered batch failed execution.
    MessageFailed {
        /// Emitting (destination) network.
        dest: NetworkId,
        /// Content-addressed message id.
        message_id: Hash,
        /// Containing payload id.
        payload_id: Hash,
        /// Emission point.
        meta: EventMeta,
    },
    /// A recovery attempt opened its challenge window.
    RecoveryInitiated {
        /// Emitting (destination) network.
        dest: NetworkId,
        /// Adapter the recovery targets.
        adapter: AdapterId,
        /// Bare content hash of the payload bytes.
        payload_hash: Hash,
        /// Emission point.
        meta: EventMeta,
    },
    /// A recovery attempt was disputed within its window.
    RecoveryDisputed {
        /// Emitting (destination) network.
        dest: NetworkId,
        /// Adapter the recovery targets.
        adapter: AdapterId,
        /// Bare content hash of the payload bytes.
        payload_hash: Hash,
        /// Emission point.
        meta: EventMeta,
    },
    /// An undisputed recovery attempt was executed on-network.
    RecoveryExecuted {
        /// Emitting (destination) network.
        dest: NetworkId,
        /// Adapter the recovery targets.
        adapter: AdapterId,
        /// Bare content hash of the payload bytes.
        payload_hash: Hash,
        /// Emission point.
        meta: EventMeta,
    },
}

impl ObservationEvent {
    /// Short name of the variant, for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessagePrepared { .. } => "message_prepared",
            Self::BatchSent { .. } => "batch_sent",
            Self::BatchUnderpaid { .. } => "batch_underpaid",
            Self::BatchRepaid { .. } => "batch_repaid",
            Self::BatchHandled { .. } => "batch_handled",
            Self::MessageExecuted { .. } => "message_executed",
            Self::MessageFailed { .. } => "message_failed",
            Self::RecoveryInitiated { .. } => "recovery_initiated",
            Self::RecoveryDisputed { .. } => "recovery_disputed",
            Self::RecoveryExecuted { .. } => "recovery_executed",
        }
    }

    /// Emission point of the observation.
    pub fn meta(&self) -> &EventMeta {
        match self {
            Self::MessagePrepared { meta, .. }
            | Self::BatchSent { meta, .. }
            | Self::BatchUnderpaid { meta, .. }
            | Self::BatchRepaid { meta, .. }
            | Self::BatchHandled { meta, .. }
            | Self::MessageExecuted { meta, .. }
            | Self::MessageFailed { meta, .. }
            | Self::RecoveryInitiated { meta, .. }
            | Self::RecoveryDisputed { meta, .. }
            | Self::RecoveryExecuted { meta, .. } => meta,
        }
    }
}
