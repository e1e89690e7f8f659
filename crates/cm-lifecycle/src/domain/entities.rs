//! # Domain Entities
//!
//! The four entities owned by the reconstruction core: `Message`, `Payload`,
//! `AdapterParticipation` and `RecoveryAttempt`.
//!
//! A Message is immutable once created except for `status`, the
//! payload linkage (set exactly once) and terminal timestamps. A Payload is
//! immutable in `id`/networks/`raw_bytes` after creation. Participation rows
//! are append-only facts. All entities carry the `EventMeta` of the
//! observation that created or transitioned them, for audit and replay
//! detection.

use super::errors::{LifecycleError, LifecycleResult};
use super::value_objects::{
    CompletionPath, MessageKind, MessageStatus, ParticipationKind, ParticipationSide,
    PayloadStatus, RecoveryStatus,
};
use serde::{Deserialize, Serialize};
use shared_types::{AdapterId, EventMeta, Hash, NetworkId};

/// A single protocol instruction traveling from a source network to a
/// destination network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Content hash (collides for identical content on the same pair).
    pub id: Hash,
    /// Per-id observation sequence number; disambiguates collisions.
    pub position_index: u64,
    /// Emitting network.
    pub source_network: NetworkId,
    /// Target network.
    pub dest_network: NetworkId,
    /// Wire kind.
    pub kind: MessageKind,
    /// Full wire bytes (discriminator + body).
    pub raw_payload: Vec<u8>,
    /// Containing payload id, set exactly once when the batch is sent.
    pub payload_id: Option<Hash>,
    /// Containing payload instance position, set together with `payload_id`.
    pub payload_position_index: Option<u64>,
    /// Current lifecycle state.
    pub status: MessageStatus,
    /// Timestamp of the terminal observation, if any.
    pub executed_at: Option<u64>,
    /// Observation that created this record.
    pub created: EventMeta,
    /// Observation that made this record terminal, if any.
    pub terminal: Option<EventMeta>,
}

/// Parameters for creating a Message.
#[derive(Clone, Debug)]
pub struct MessageParams {
    /// Content hash.
    pub id: Hash,
    /// Assigned position index.
    pub position_index: u64,
    /// Emitting network.
    pub source_network: NetworkId,
    /// Target network.
    pub dest_network: NetworkId,
    /// Wire kind.
    pub kind: MessageKind,
    /// Full wire bytes.
    pub raw_payload: Vec<u8>,
    /// Creating observation.
    pub created: EventMeta,
}

impl Message {
    /// Create a new Message in `AwaitingBatchDelivery`.
    pub fn new(params: MessageParams) -> Self {
        Self {
            id: params.id,
            position_index: params.position_index,
            source_network: params.source_network,
            dest_network: params.dest_network,
            kind: params.kind,
            raw_payload: params.raw_payload,
            payload_id: None,
            payload_position_index: None,
            status: MessageStatus::AwaitingBatchDelivery,
            executed_at: None,
            created: params.created,
            terminal: None,
        }
    }

    /// Whether this instance has been linked to a payload instance.
    pub fn is_linked(&self) -> bool {
        self.payload_id.is_some()
    }

    /// Whether this instance is linked to exactly this payload instance.
    pub fn is_linked_to(&self, payload_id: &Hash, payload_position: u64) -> bool {
        self.payload_id.as_ref() == Some(payload_id)
            && self.payload_position_index == Some(payload_position)
    }

    /// Link to the containing payload instance. Set exactly once.
    pub fn link(&mut self, payload_id: Hash, payload_position: u64) -> LifecycleResult<()> {
        if self.is_linked() && !self.is_linked_to(&payload_id, payload_position) {
            return Err(LifecycleError::ConflictingLink { message: self.id });
        }
        self.payload_id = Some(payload_id);
        self.payload_position_index = Some(payload_position);
        Ok(())
    }

    /// Transition to a terminal state, stamping the triggering observation.
    pub fn mark_terminal(&mut self, next: MessageStatus, meta: EventMeta) -> LifecycleResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                entity: "message",
                from: format!("{:?}", self.status),
                to: format!("{:?}", next),
            });
        }
        self.status = next;
        self.executed_at = Some(meta.timestamp);
        self.terminal = Some(meta);
        Ok(())
    }
}

/// An ordered batch of zero or more Messages sent as one unit between two
/// networks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payload {
    /// Content hash of `(source, dest, H(raw_bytes))`.
    pub id: Hash,
    /// Per-id observation sequence number.
    pub position_index: u64,
    /// Emitting network.
    pub source_network: NetworkId,
    /// Target network.
    pub dest_network: NetworkId,
    /// Raw batch bytes.
    pub raw_bytes: Vec<u8>,
    /// Bare `H(raw_bytes)`, the key the recovery path matches on.
    pub content_hash: Hash,
    /// Current lifecycle state.
    pub status: PayloadStatus,
    /// Timestamp of the delivery observation, if any.
    pub delivered_at: Option<u64>,
    /// Timestamp of the completion observation, if any.
    pub completed_at: Option<u64>,
    /// How completion was reached, once terminal.
    pub completed_via: Option<CompletionPath>,
    /// Set when a recovery execution force-delivered this instance.
    pub recovered: bool,
    /// Observation that created this record.
    pub created: EventMeta,
    /// Observation of the fee top-up, if any.
    pub repaid: Option<EventMeta>,
    /// Observation of the delivery, if any.
    pub delivered: Option<EventMeta>,
    /// Observation that completed this record, if any.
    pub completed: Option<EventMeta>,
}

/// Parameters for creating a Payload.
#[derive(Clone, Debug)]
pub struct PayloadParams {
    /// Content-addressed id.
    pub id: Hash,
    /// Assigned position index.
    pub position_index: u64,
    /// Emitting network.
    pub source_network: NetworkId,
    /// Target network.
    pub dest_network: NetworkId,
    /// Raw batch bytes.
    pub raw_bytes: Vec<u8>,
    /// Bare content hash of the batch bytes.
    pub content_hash: Hash,
    /// `Underpaid` or `InTransit`, depending on the fee paid at send time.
    pub initial_status: PayloadStatus,
    /// Creating observation.
    pub created: EventMeta,
}

impl Payload {
    /// Create a new Payload.
    pub fn new(params: PayloadParams) -> Self {
        Self {
            id: params.id,
            position_index: params.position_index,
            source_network: params.source_network,
            dest_network: params.dest_network,
            raw_bytes: params.raw_bytes,
            content_hash: params.content_hash,
            status: params.initial_status,
            delivered_at: None,
            completed_at: None,
            completed_via: None,
            recovered: false,
            created: params.created,
            repaid: None,
            delivered: None,
            completed: None,
        }
    }

    /// Transition to a new state, enforcing monotonicity.
    pub fn transition_to(&mut self, next: PayloadStatus) -> LifecycleResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                entity: "payload",
                from: format!("{:?}", self.status),
                to: format!("{:?}", next),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// One adapter's observed participation in moving a payload instance.
/// Append-only; never mutated or deleted. Used purely as a vote ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterParticipation {
    /// Payload content id.
    pub payload_id: Hash,
    /// Payload instance position. Quorum is evaluated per instance, never
    /// mixed across colliding instances.
    pub payload_position_index: u64,
    /// Participating adapter.
    pub adapter_id: AdapterId,
    /// Send or handle side.
    pub side: ParticipationSide,
    /// Payload or proof.
    pub kind: ParticipationKind,
    /// Source network of the transfer.
    pub source_network: NetworkId,
    /// Destination network of the transfer.
    pub dest_network: NetworkId,
    /// Emitting observation.
    pub meta: EventMeta,
}

impl AdapterParticipation {
    /// Row identity: the full tuple including the emission point, so a
    /// replayed observation upserts rather than duplicating.
    pub fn same_row(&self, other: &AdapterParticipation) -> bool {
        self.payload_id == other.payload_id
            && self.payload_position_index == other.payload_position_index
            && self.adapter_id == other.adapter_id
            && self.side == other.side
            && self.kind == other.kind
            && self.meta.same_emission(&other.meta)
    }
}

/// An in-flight dispute/recovery window, keyed by
/// `(dest_network, adapter_id, payload_hash)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryAttempt {
    /// Network the recovery was initiated on.
    pub dest_network: NetworkId,
    /// Adapter the recovery was initiated through.
    pub adapter_id: AdapterId,
    /// Bare content hash of the payload bytes.
    pub payload_hash: Hash,
    /// Timestamp the window opened (event time, not wall clock).
    pub initiated_at: u64,
    /// Current state.
    pub status: RecoveryStatus,
    /// Observation that opened the window.
    pub initiated: EventMeta,
    /// Observation that resolved the window (dispute or execution), if any.
    pub resolved: Option<EventMeta>,
}

impl RecoveryAttempt {
    /// Create a new attempt with an open challenge window.
    pub fn new(
        dest_network: NetworkId,
        adapter_id: AdapterId,
        payload_hash: Hash,
        meta: EventMeta,
    ) -> Self {
        Self {
            dest_network,
            adapter_id,
            payload_hash,
            initiated_at: meta.timestamp,
            status: RecoveryStatus::Initiated,
            initiated: meta,
            resolved: None,
        }
    }

    /// Whether the challenge period has elapsed at the given event time.
    pub fn challenge_elapsed(&self, now: u64, challenge_period_secs: u64) -> bool {
        now.saturating_sub(self.initiated_at) >= challenge_period_secs
    }

    /// Transition to a resolved state.
    pub fn resolve(&mut self, next: RecoveryStatus, meta: EventMeta) -> LifecycleResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                entity: "recovery",
                from: format!("{:?}", self.status),
                to: format!("{:?}", next),
            });
        }
        self.status = next;
        self.resolved = Some(meta);
        Ok(())
    }
}
