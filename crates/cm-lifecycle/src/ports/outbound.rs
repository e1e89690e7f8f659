//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Typed store traits implemented by the persistence layer. Keys are the
//! entities' declared identity fields; instance queries return ascending
//! `position_index` order, which the pending-queue matching relies on.
//!
//! The engine calls these under its own serialization point, so
//! implementations need no internal ordering guarantees beyond the declared
//! query order.

use crate::domain::entities::{AdapterParticipation, Message, Payload, RecoveryAttempt};
use crate::domain::errors::LifecycleResult;
use shared_types::{AdapterId, Hash, NetworkId};

/// Persistence for Message records, keyed by `(id, position_index)`.
pub trait MessageStore: Send + Sync {
    /// Insert a new instance. Fails if the key already exists.
    fn insert(&mut self, message: Message) -> LifecycleResult<()>;

    /// Replace an existing instance under the same key.
    fn update(&mut self, message: Message) -> LifecycleResult<()>;

    /// All instances of a content id, ascending by position index.
    fn instances(&self, id: &Hash) -> LifecycleResult<Vec<Message>>;

    /// All messages linked to a payload instance, ascending by the
    /// message's own position index.
    fn by_payload(&self, payload_id: &Hash, payload_position: u64)
        -> LifecycleResult<Vec<Message>>;
}

/// Persistence for Payload records, keyed by `(id, position_index)`.
pub trait PayloadStore: Send + Sync {
    /// Insert a new instance. Fails if the key already exists.
    fn insert(&mut self, payload: Payload) -> LifecycleResult<()>;

    /// Replace an existing instance under the same key.
    fn update(&mut self, payload: Payload) -> LifecycleResult<()>;

    /// Fetch one instance by key.
    fn get(&self, id: &Hash, position: u64) -> LifecycleResult<Option<Payload>>;

    /// All instances of a content id, ascending by position index.
    fn instances(&self, id: &Hash) -> LifecycleResult<Vec<Payload>>;

    /// All instances toward a destination network whose raw bytes hash to
    /// `content_hash`, ascending by position index. The recovery path only
    /// knows the bare content hash.
    fn by_content_hash(
        &self,
        dest: NetworkId,
        content_hash: &Hash,
    ) -> LifecycleResult<Vec<Payload>>;
}

/// Persistence for the append-only adapter participation ledger.
pub trait ParticipationStore: Send + Sync {
    /// Record a participation row. Rows are pure facts; a row with the same
    /// identity tuple (see `AdapterParticipation::same_row`) replaces
    /// nothing and adds nothing — replays are absorbed.
    fn upsert(&mut self, row: AdapterParticipation) -> LifecycleResult<()>;

    /// All rows for one payload instance.
    fn for_instance(
        &self,
        payload_id: &Hash,
        payload_position: u64,
    ) -> LifecycleResult<Vec<AdapterParticipation>>;
}

/// Persistence for recovery attempts, keyed by
/// `(dest_network, adapter_id, payload_hash)`.
pub trait RecoveryStore: Send + Sync {
    /// Insert or replace the attempt under its key.
    fn upsert(&mut self, attempt: RecoveryAttempt) -> LifecycleResult<()>;

    /// Fetch the attempt under a key.
    fn get(
        &self,
        dest: NetworkId,
        adapter: &AdapterId,
        payload_hash: &Hash,
    ) -> LifecycleResult<Option<RecoveryAttempt>>;
}
