//! In-memory store implementations.
//!
//! HashMap-backed reference stores. Instance queries sort ascending by
//! `position_index` as the ports require; everything else is straight map
//! access. Thread safety comes from the service's lock, not from here.

use crate::domain::entities::{AdapterParticipation, Message, Payload, RecoveryAttempt};
use crate::domain::errors::{LifecycleError, LifecycleResult};
use crate::ports::outbound::{MessageStore, ParticipationStore, PayloadStore, RecoveryStore};
use shared_types::{AdapterId, Hash, NetworkId};
use std::collections::HashMap;

fn duplicate_key(entity: &str) -> LifecycleError {
    LifecycleError::Store {
        reason: format!("duplicate {entity} instance key"),
    }
}

fn missing_key(entity: &str) -> LifecycleError {
    LifecycleError::Store {
        reason: format!("update of missing {entity} instance"),
    }
}

/// In-memory `MessageStore`.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    rows: HashMap<(Hash, u64), Message>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageStore for InMemoryMessageStore {
    fn insert(&mut self, message: Message) -> LifecycleResult<()> {
        let key = (message.id, message.position_index);
        if self.rows.contains_key(&key) {
            return Err(duplicate_key("message"));
        }
        self.rows.insert(key, message);
        Ok(())
    }

    fn update(&mut self, message: Message) -> LifecycleResult<()> {
        let key = (message.id, message.position_index);
        if !self.rows.contains_key(&key) {
            return Err(missing_key("message"));
        }
        self.rows.insert(key, message);
        Ok(())
    }

    fn instances(&self, id: &Hash) -> LifecycleResult<Vec<Message>> {
        let mut found: Vec<Message> = self
            .rows
            .values()
            .filter(|m| &m.id == id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.position_index);
        Ok(found)
    }

    fn by_payload(
        &self,
        payload_id: &Hash,
        payload_position: u64,
    ) -> LifecycleResult<Vec<Message>> {
        let mut found: Vec<Message> = self
            .rows
            .values()
            .filter(|m| m.is_linked_to(payload_id, payload_position))
            .cloned()
            .collect();
        found.sort_by_key(|m| m.position_index);
        Ok(found)
    }
}

/// In-memory `PayloadStore`.
#[derive(Debug, Default)]
pub struct InMemoryPayloadStore {
    rows: HashMap<(Hash, u64), Payload>,
}

impl InMemoryPayloadStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayloadStore for InMemoryPayloadStore {
    fn insert(&mut self, payload: Payload) -> LifecycleResult<()> {
        let key = (payload.id, payload.position_index);
        if self.rows.contains_key(&key) {
            return Err(duplicate_key("payload"));
        }
        self.rows.insert(key, payload);
        Ok(())
    }

    fn update(&mut self, payload: Payload) -> LifecycleResult<()> {
        let key = (payload.id, payload.position_index);
        if !self.rows.contains_key(&key) {
            return Err(missing_key("payload"));
        }
        self.rows.insert(key, payload);
        Ok(())
    }

    fn get(&self, id: &Hash, position: u64) -> LifecycleResult<Option<Payload>> {
        Ok(self.rows.get(&(*id, position)).cloned())
    }

    fn instances(&self, id: &Hash) -> LifecycleResult<Vec<Payload>> {
        let mut found: Vec<Payload> = self
            .rows
            .values()
            .filter(|p| &p.id == id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.position_index);
        Ok(found)
    }

    fn by_content_hash(
        &self,
        dest: NetworkId,
        content_hash: &Hash,
    ) -> LifecycleResult<Vec<Payload>> {
        let mut found: Vec<Payload> = self
            .rows
            .values()
            .filter(|p| p.dest_network == dest && &p.content_hash == content_hash)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.position_index);
        Ok(found)
    }
}

/// In-memory `ParticipationStore`. Append-only; `upsert` drops exact
/// duplicates by row identity.
#[derive(Debug, Default)]
pub struct InMemoryParticipationStore {
    rows: Vec<AdapterParticipation>,
}

impl InMemoryParticipationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParticipationStore for InMemoryParticipationStore {
    fn upsert(&mut self, row: AdapterParticipation) -> LifecycleResult<()> {
        if self.rows.iter().any(|r| r.same_row(&row)) {
            return Ok(());
        }
        self.rows.push(row);
        Ok(())
    }

    fn for_instance(
        &self,
        payload_id: &Hash,
        payload_position: u64,
    ) -> LifecycleResult<Vec<AdapterParticipation>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| {
                &r.payload_id == payload_id && r.payload_position_index == payload_position
            })
            .cloned()
            .collect())
    }
}

/// In-memory `RecoveryStore`.
#[derive(Debug, Default)]
pub struct InMemoryRecoveryStore {
    rows: HashMap<(NetworkId, AdapterId, Hash), RecoveryAttempt>,
}

impl InMemoryRecoveryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecoveryStore for InMemoryRecoveryStore {
    fn upsert(&mut self, attempt: RecoveryAttempt) -> LifecycleResult<()> {
        let key = (attempt.dest_network, attempt.adapter_id, attempt.payload_hash);
        self.rows.insert(key, attempt);
        Ok(())
    }

    fn get(
        &self,
        dest: NetworkId,
        adapter: &AdapterId,
        payload_hash: &Hash,
    ) -> LifecycleResult<Option<RecoveryAttempt>> {
        Ok(self.rows.get(&(dest, *adapter, *payload_hash)).cloned())
    }
}
