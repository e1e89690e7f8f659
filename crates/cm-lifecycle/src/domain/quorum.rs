//! Adapter quorum tracking.
//!
//! A payload instance is quorum-confirmed when enough *distinct* adapters
//! have been observed handling it (payload or proof) on the destination
//! network. Quorum is evaluated per exact `(payload_id, position_index)`;
//! colliding instances never share votes.

use crate::domain::entities::AdapterParticipation;
use crate::domain::errors::LifecycleResult;
use crate::domain::value_objects::ParticipationSide;
use crate::ports::outbound::ParticipationStore;
use shared_types::{short_hex, Hash};
use std::collections::HashSet;
use tracing::debug;

/// Counts distinct handle-side adapters per payload instance against a
/// destination-network threshold.
pub struct AdapterQuorumTracker<'a> {
    store: &'a mut dyn ParticipationStore,
}

impl<'a> AdapterQuorumTracker<'a> {
    /// Wrap a store for one event application.
    pub fn new(store: &'a mut dyn ParticipationStore) -> Self {
        Self { store }
    }

    /// Record an observed participation. Replays of the same emission are
    /// absorbed by the store's row identity.
    pub fn record(&mut self, row: AdapterParticipation) -> LifecycleResult<()> {
        debug!(
            payload = %short_hex(&row.payload_id),
            position = row.payload_position_index,
            adapter = %short_hex(&row.adapter_id),
            side = ?row.side,
            kind = ?row.kind,
            "participation recorded"
        );
        self.store.upsert(row)
    }

    /// Number of distinct adapters observed handling the instance on the
    /// destination side. Send-side rows never count toward quorum.
    pub fn handle_count(&self, payload_id: &Hash, position: u64) -> LifecycleResult<usize> {
        let rows = self.store.for_instance(payload_id, position)?;
        let distinct: HashSet<_> = rows
            .iter()
            .filter(|r| r.side == ParticipationSide::Handle)
            .map(|r| r.adapter_id)
            .collect();
        Ok(distinct.len())
    }

    /// Whether the instance has reached the given confirmation threshold.
    pub fn quorum_reached(
        &self,
        payload_id: &Hash,
        position: u64,
        threshold: u32,
    ) -> LifecycleResult<bool> {
        Ok(self.handle_count(payload_id, position)? >= threshold as usize)
    }
}
