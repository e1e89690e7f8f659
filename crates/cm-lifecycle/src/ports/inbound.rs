//! Driving Ports (API - Inbound Dependencies)
//!
//! The surface the network-watching layer drives: one `apply` entry point
//! per observed emission, plus read queries for reconstructed state.

use crate::domain::entities::{AdapterParticipation, Message, Payload, RecoveryAttempt};
use crate::domain::errors::LifecycleResult;
use crate::events::ObservationEvent;
use async_trait::async_trait;
use shared_types::{AdapterId, Hash, NetworkId};

/// Inbound API of the lifecycle reconstruction engine.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Apply one observed emission. Idempotent under at-least-once replay:
    /// applying the same emission twice leaves state unchanged.
    async fn apply(&self, event: ObservationEvent) -> LifecycleResult<()>;

    /// All instances of a message content id, ascending by position.
    async fn message_instances(&self, id: &Hash) -> LifecycleResult<Vec<Message>>;

    /// All instances of a payload content id, ascending by position.
    async fn payload_instances(&self, id: &Hash) -> LifecycleResult<Vec<Payload>>;

    /// Participation rows recorded for one payload instance.
    async fn participation_for(
        &self,
        payload_id: &Hash,
        position: u64,
    ) -> LifecycleResult<Vec<AdapterParticipation>>;

    /// Recovery attempt under a key, if any.
    async fn recovery_attempt(
        &self,
        dest: NetworkId,
        adapter: &AdapterId,
        payload_hash: &Hash,
    ) -> LifecycleResult<Option<RecoveryAttempt>>;
}
