//! Payload lifecycle ledger.
//!
//! `(none) → Underpaid → InTransit → Delivered → Completed | PartiallyFailed`,
//! with the direct `(none) → InTransit` path when the send fee was
//! sufficient. Transitions are monotonic; an invalid transition is logged
//! and dropped for that record only, never propagated to siblings.

use crate::domain::entities::{Payload, PayloadParams};
use crate::domain::errors::{LifecycleError, LifecycleResult};
use crate::domain::identity::IdentityHasher;
use crate::domain::pending::{next_position, oldest_matching};
use crate::domain::value_objects::{CompletionPath, PayloadStatus};
use crate::ports::outbound::PayloadStore;
use shared_types::{short_hex, EventMeta, Hash, NetworkId};
use tracing::{debug, error, warn};

/// Owns per-payload lifecycle state.
pub struct PayloadLedger<'a> {
    store: &'a mut dyn PayloadStore,
}

impl<'a> PayloadLedger<'a> {
    /// Wrap a store for one event application.
    pub fn new(store: &'a mut dyn PayloadStore) -> Self {
        Self { store }
    }

    /// Record a sufficiently paid send: creates an `InTransit` instance.
    pub fn observe_sent(
        &mut self,
        source: NetworkId,
        dest: NetworkId,
        raw_bytes: Vec<u8>,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        self.create_instance(source, dest, raw_bytes, PayloadStatus::InTransit, meta)
    }

    /// Record an underpaid send: creates an `Underpaid` instance awaiting a
    /// fee top-up.
    pub fn observe_underpaid(
        &mut self,
        source: NetworkId,
        dest: NetworkId,
        raw_bytes: Vec<u8>,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        self.create_instance(source, dest, raw_bytes, PayloadStatus::Underpaid, meta)
    }

    fn create_instance(
        &mut self,
        source: NetworkId,
        dest: NetworkId,
        raw_bytes: Vec<u8>,
        initial_status: PayloadStatus,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        let id = IdentityHasher::payload_id(source, dest, &raw_bytes);
        let instances = self.store.instances(&id)?;
        // One send transaction emits one event per carrying adapter; every
        // emission after the first (and any replay) maps onto the instance
        // that transaction already created.
        if instances.iter().any(|p| p.created.tx_hash == meta.tx_hash) {
            debug!(payload = %short_hex(&id), "send already recorded for this transaction");
            return Ok(None);
        }
        let payload = Payload::new(PayloadParams {
            id,
            position_index: next_position(&instances),
            source_network: source,
            dest_network: dest,
            content_hash: IdentityHasher::payload_content_hash(&raw_bytes),
            raw_bytes,
            initial_status,
            created: meta,
        });
        self.store.insert(payload.clone())?;
        Ok(Some(payload))
    }

    /// Record a fee top-up: oldest `Underpaid` instance becomes `InTransit`.
    /// The existing record transitions; no new instance is created.
    pub fn mark_repaid(&mut self, id: &Hash, meta: EventMeta) -> LifecycleResult<Option<Payload>> {
        let instances = self.store.instances(id)?;
        if instances
            .iter()
            .any(|p| p.repaid.map(|m| m.same_emission(&meta)).unwrap_or(false))
        {
            debug!(payload = %short_hex(id), "repaid replay");
            return Ok(None);
        }
        match oldest_matching(&instances, |p| p.status == PayloadStatus::Underpaid) {
            Some(found) => {
                let mut payload = found.clone();
                payload.transition_to(PayloadStatus::InTransit)?;
                payload.repaid = Some(meta);
                self.store.update(payload.clone())?;
                Ok(Some(payload))
            }
            None => {
                warn!(payload = %short_hex(id), "repaid event without underpaid instance");
                Ok(None)
            }
        }
    }

    /// Record delivery on the destination network: oldest `InTransit`
    /// instance becomes `Delivered`.
    pub fn mark_delivered(
        &mut self,
        id: &Hash,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        let instances = self.store.instances(id)?;
        if instances
            .iter()
            .any(|p| p.delivered.map(|m| m.same_emission(&meta)).unwrap_or(false))
        {
            debug!(payload = %short_hex(id), "delivery replay");
            return Ok(None);
        }
        match oldest_matching(&instances, |p| p.status == PayloadStatus::InTransit) {
            Some(found) => {
                let mut payload = found.clone();
                payload.transition_to(PayloadStatus::Delivered)?;
                payload.delivered_at = Some(meta.timestamp);
                payload.delivered = Some(meta);
                self.store.update(payload.clone())?;
                Ok(Some(payload))
            }
            None => {
                warn!(payload = %short_hex(id), "delivery event without in-transit instance");
                Ok(None)
            }
        }
    }

    /// Oldest instance that is not yet terminal; the target for proof
    /// participations, which carry no position of their own.
    pub fn oldest_open(&self, id: &Hash) -> LifecycleResult<Option<Payload>> {
        let instances = self.store.instances(id)?;
        Ok(oldest_matching(&instances, |p| !p.status.is_terminal()).cloned())
    }

    /// Complete a `Delivered` instance, stamping the completion path.
    ///
    /// `PartiallyFailed` is chosen when any linked message failed. Invalid
    /// transitions (the instance moved concurrently or the event is stale)
    /// are logged and dropped.
    pub fn complete(
        &mut self,
        id: &Hash,
        position: u64,
        any_failed: bool,
        path: CompletionPath,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        let Some(mut payload) = self.store.get(id, position)? else {
            warn!(payload = %short_hex(id), position, "completion for unknown instance");
            return Ok(None);
        };
        if payload.status.is_terminal() {
            debug!(payload = %short_hex(id), position, "completion replay");
            return Ok(None);
        }
        let target = if any_failed {
            PayloadStatus::PartiallyFailed
        } else {
            PayloadStatus::Completed
        };
        if let Err(e @ LifecycleError::InvalidTransition { .. }) = payload.transition_to(target) {
            error!(payload = %short_hex(id), position, %e, "dropping invalid completion");
            return Ok(None);
        }
        payload.completed_at = Some(meta.timestamp);
        payload.completed = Some(meta);
        payload.completed_via = Some(path);
        self.store.update(payload.clone())?;
        Ok(Some(payload))
    }

    /// Force-deliver an instance through an executed recovery, bypassing the
    /// normal fee/delivery observations. Walks the remaining forward
    /// transitions so monotonicity still holds, and flags the instance as
    /// recovered so its eventual completion is auditable as degraded-trust.
    pub fn force_deliver(
        &mut self,
        id: &Hash,
        position: u64,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        let Some(mut payload) = self.store.get(id, position)? else {
            warn!(payload = %short_hex(id), position, "forced delivery for unknown instance");
            return Ok(None);
        };
        if payload.status.is_terminal() {
            debug!(payload = %short_hex(id), position, "forced delivery replay");
            return Ok(None);
        }
        if payload.status == PayloadStatus::Underpaid {
            payload.transition_to(PayloadStatus::InTransit)?;
        }
        if payload.status == PayloadStatus::InTransit {
            payload.transition_to(PayloadStatus::Delivered)?;
            payload.delivered_at = Some(meta.timestamp);
            payload.delivered = Some(meta);
        }
        payload.recovered = true;
        self.store.update(payload.clone())?;
        Ok(Some(payload))
    }
}
