//! Lifecycle Service - composition root.
//!
//! Routes every normalized observation to the owning domain component,
//! holding the store lock for the duration of one event so concurrent
//! watchers serialize cleanly. All completion decisions funnel through
//! [`LifecycleService::try_complete`], the single place where quorum state,
//! recovery state and message terminality meet.

use crate::codec::{split_batch, CodecError, MessageBody};
use crate::domain::entities::{AdapterParticipation, Message, Payload, RecoveryAttempt};
use crate::domain::errors::LifecycleResult;
use crate::domain::identity::IdentityHasher;
use crate::domain::ledger::{MessageLedger, PayloadLedger};
use crate::domain::pending::oldest_matching;
use crate::domain::quorum::AdapterQuorumTracker;
use crate::domain::recovery::{RecoveryCoordinator, CHALLENGE_PERIOD_SECS};
use crate::domain::value_objects::{
    CompletionPath, ParticipationKind, ParticipationSide, PayloadStatus,
};
use crate::events::ObservationEvent;
use crate::ports::inbound::LifecycleApi;
use crate::ports::outbound::{MessageStore, ParticipationStore, PayloadStore, RecoveryStore};
use async_trait::async_trait;
use crossmesh_telemetry::metrics;
use parking_lot::RwLock;
use shared_types::{short_hex, AdapterId, EventMeta, Hash, NetworkId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Per-destination adapter confirmation thresholds.
#[derive(Clone, Debug)]
pub struct QuorumConfig {
    /// Overrides per destination network.
    pub thresholds: HashMap<NetworkId, u32>,
    /// Threshold for networks without an override.
    pub default_threshold: u32,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            thresholds: HashMap::new(),
            default_threshold: 2,
        }
    }
}

impl QuorumConfig {
    /// Confirmation threshold for a destination network.
    pub fn threshold_for(&self, dest: NetworkId) -> u32 {
        self.thresholds
            .get(&dest)
            .copied()
            .unwrap_or(self.default_threshold)
    }
}

/// Lifecycle engine configuration.
#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    /// Adapter quorum thresholds.
    pub quorum: QuorumConfig,
    /// Seconds a recovery must sit undisputed before execution is valid.
    pub challenge_period_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            quorum: QuorumConfig::default(),
            challenge_period_secs: CHALLENGE_PERIOD_SECS,
        }
    }
}

/// The four outbound stores, owned together so one lock covers them all.
pub struct EngineStores {
    /// Message persistence.
    pub messages: Box<dyn MessageStore>,
    /// Payload persistence.
    pub payloads: Box<dyn PayloadStore>,
    /// Participation row persistence.
    pub participations: Box<dyn ParticipationStore>,
    /// Recovery attempt persistence.
    pub recoveries: Box<dyn RecoveryStore>,
}

/// Lifecycle reconstruction engine.
pub struct LifecycleService {
    config: LifecycleConfig,
    state: RwLock<EngineStores>,
}

impl LifecycleService {
    /// Create a service over the given stores.
    pub fn new(config: LifecycleConfig, stores: EngineStores) -> Self {
        Self {
            config,
            state: RwLock::new(stores),
        }
    }

    /// Create a service over fresh in-memory stores.
    pub fn in_memory(config: LifecycleConfig) -> Self {
        use crate::adapters::memory::{
            InMemoryMessageStore, InMemoryParticipationStore, InMemoryPayloadStore,
            InMemoryRecoveryStore,
        };
        Self::new(
            config,
            EngineStores {
                messages: Box::new(InMemoryMessageStore::new()),
                payloads: Box::new(InMemoryPayloadStore::new()),
                participations: Box::new(InMemoryParticipationStore::new()),
                recoveries: Box::new(InMemoryRecoveryStore::new()),
            },
        )
    }

    fn handle_message_prepared(
        &self,
        stores: &mut EngineStores,
        source: NetworkId,
        dest: NetworkId,
        raw_message: Vec<u8>,
        meta: EventMeta,
    ) -> LifecycleResult<()> {
        let body = match MessageBody::decode(&raw_message) {
            Ok(body) => body,
            Err(e) => {
                metrics::BATCH_DECODE_FAILURES
                    .with_label_values(&[decode_failure_reason(&e)])
                    .inc();
                warn!(%source, %dest, %e, "undecodable prepared message; dropping");
                return Ok(());
            }
        };
        let created = MessageLedger::new(stores.messages.as_mut()).observe_prepared(
            source,
            dest,
            body.kind(),
            raw_message,
            meta,
        )?;
        if created.is_some() {
            metrics::MESSAGES_OBSERVED.inc();
        }
        Ok(())
    }

    /// Shared path for paid and underpaid sends: create (or re-find) the
    /// payload instance and link the batch's messages to it.
    fn handle_batch_send(
        &self,
        stores: &mut EngineStores,
        source: NetworkId,
        dest: NetworkId,
        raw_batch: Vec<u8>,
        underpaid: bool,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Payload>> {
        let mut ledger = PayloadLedger::new(stores.payloads.as_mut());
        let created = if underpaid {
            ledger.observe_underpaid(source, dest, raw_batch.clone(), meta)?
        } else {
            ledger.observe_sent(source, dest, raw_batch.clone(), meta)?
        };
        let payload = match created {
            Some(payload) => {
                metrics::PAYLOADS_OBSERVED.inc();
                payload
            }
            // Another adapter's emission from the same send transaction, or
            // a replay: re-find the instance that transaction created so the
            // participation row lands on it and the message links (idempotent
            // themselves) still resolve.
            None => {
                let id = IdentityHasher::payload_id(source, dest, &raw_batch);
                let instances = stores.payloads.instances(&id)?;
                match instances.into_iter().find(|p| p.created.tx_hash == meta.tx_hash) {
                    Some(payload) => payload,
                    None => return Ok(None),
                }
            }
        };

        let split = split_batch(&payload.raw_bytes);
        if let Some(e) = &split.error {
            metrics::BATCH_DECODE_FAILURES
                .with_label_values(&[decode_failure_reason(e)])
                .inc();
            warn!(
                payload = %short_hex(&payload.id),
                %e,
                linked = split.messages.len(),
                "batch split stopped early; linking decoded prefix only"
            );
        }
        let mut messages = MessageLedger::new(stores.messages.as_mut());
        for raw in &split.messages {
            let message_id = IdentityHasher::message_id(source, dest, &raw.bytes);
            messages.link_to_payload(&message_id, payload.id, payload.position_index)?;
        }
        Ok(Some(payload))
    }

    fn record_participation(
        &self,
        stores: &mut EngineStores,
        payload: &Payload,
        adapter: AdapterId,
        side: ParticipationSide,
        kind: ParticipationKind,
        meta: EventMeta,
    ) -> LifecycleResult<()> {
        AdapterQuorumTracker::new(stores.participations.as_mut()).record(AdapterParticipation {
            payload_id: payload.id,
            payload_position_index: payload.position_index,
            adapter_id: adapter,
            side,
            kind,
            source_network: payload.source_network,
            dest_network: payload.dest_network,
            meta,
        })?;
        metrics::PARTICIPATIONS_RECORDED.inc();
        Ok(())
    }

    fn handle_batch_handled(
        &self,
        stores: &mut EngineStores,
        payload_id: Hash,
        adapter: AdapterId,
        kind: ParticipationKind,
        meta: EventMeta,
    ) -> LifecycleResult<()> {
        // The payload carrier performs the delivery; proof carriers only
        // vote. Either way the target is resolved FIFO.
        let target = match kind {
            ParticipationKind::Payload => {
                let delivered =
                    PayloadLedger::new(stores.payloads.as_mut()).mark_delivered(&payload_id, meta)?;
                match delivered {
                    Some(payload) => {
                        metrics::PAYLOADS_DELIVERED.inc();
                        Some(payload)
                    }
                    // Replay or out-of-order: attribute to the instance this
                    // emission delivered, else the oldest open one.
                    None => {
                        let instances = stores.payloads.instances(&payload_id)?;
                        instances
                            .iter()
                            .find(|p| {
                                p.delivered.map(|d| d.same_emission(&meta)).unwrap_or(false)
                            })
                            .or_else(|| oldest_matching(&instances, |p| !p.status.is_terminal()))
                            .cloned()
                    }
                }
            }
            ParticipationKind::Proof => {
                PayloadLedger::new(stores.payloads.as_mut()).oldest_open(&payload_id)?
            }
        };

        let Some(payload) = target else {
            warn!(
                payload = %short_hex(&payload_id),
                adapter = %short_hex(&adapter),
                "handle observation with no open payload instance; dropping"
            );
            return Ok(());
        };

        self.record_participation(
            &mut *stores,
            &payload,
            adapter,
            ParticipationSide::Handle,
            kind,
            meta,
        )?;
        self.try_complete(stores, &payload.id, payload.position_index, meta)
    }

    fn handle_message_terminal(
        &self,
        stores: &mut EngineStores,
        message_id: Hash,
        payload_id: Hash,
        failed: bool,
        meta: EventMeta,
    ) -> LifecycleResult<()> {
        // Execution happens against the oldest still-open payload instance.
        let Some(payload) =
            PayloadLedger::new(stores.payloads.as_mut()).oldest_open(&payload_id)?
        else {
            warn!(
                message = %short_hex(&message_id),
                payload = %short_hex(&payload_id),
                "terminal message event with no open payload instance"
            );
            return Ok(());
        };

        let mut messages = MessageLedger::new(stores.messages.as_mut());
        let updated = if failed {
            messages.mark_failed(&message_id, &payload.id, payload.position_index, meta)?
        } else {
            messages.mark_executed(&message_id, &payload.id, payload.position_index, meta)?
        };
        if updated.is_some() {
            if failed {
                metrics::MESSAGES_FAILED.inc();
            } else {
                metrics::MESSAGES_EXECUTED.inc();
            }
        }
        self.try_complete(stores, &payload.id, payload.position_index, meta)
    }

    fn handle_recovery_executed(
        &self,
        stores: &mut EngineStores,
        dest: NetworkId,
        adapter: AdapterId,
        payload_hash: Hash,
        meta: EventMeta,
    ) -> LifecycleResult<()> {
        let executed = RecoveryCoordinator::new(
            stores.recoveries.as_mut(),
            self.config.challenge_period_secs,
        )
        .observe_executed(dest, &adapter, &payload_hash, meta)?;
        let Some(_attempt) = executed else {
            return Ok(());
        };
        metrics::RECOVERIES_EXECUTED.inc();

        // The recovery key carries only the bare content hash; resolve it to
        // the oldest open instance bound for this network.
        let candidates = stores.payloads.by_content_hash(dest, &payload_hash)?;
        let Some(open) = oldest_matching(&candidates, |p| !p.status.is_terminal()).cloned() else {
            warn!(
                payload_hash = %short_hex(&payload_hash),
                %dest,
                "executed recovery matches no open payload instance"
            );
            return Ok(());
        };

        let forced = PayloadLedger::new(stores.payloads.as_mut()).force_deliver(
            &open.id,
            open.position_index,
            meta,
        )?;
        if let Some(payload) = forced {
            metrics::PAYLOADS_DELIVERED.inc();
            self.try_complete(stores, &payload.id, payload.position_index, meta)?;
        }
        Ok(())
    }

    /// Complete a payload instance if it is eligible: delivered, confirmed
    /// (quorum or recovery), and every linked message terminal.
    fn try_complete(
        &self,
        stores: &mut EngineStores,
        payload_id: &Hash,
        position: u64,
        meta: EventMeta,
    ) -> LifecycleResult<()> {
        let Some(payload) = stores.payloads.get(payload_id, position)? else {
            return Ok(());
        };
        if payload.status != PayloadStatus::Delivered {
            return Ok(());
        }

        let threshold = self.config.quorum.threshold_for(payload.dest_network);
        let quorum = AdapterQuorumTracker::new(stores.participations.as_mut()).quorum_reached(
            payload_id,
            position,
            threshold,
        )?;
        if !quorum && !payload.recovered {
            return Ok(());
        }

        let summary =
            MessageLedger::new(stores.messages.as_mut()).terminal_summary(payload_id, position)?;
        if !summary.all_terminal {
            debug!(
                payload = %short_hex(payload_id),
                position,
                linked = summary.total,
                "confirmed but messages still pending"
            );
            return Ok(());
        }

        // Quorum is the authoritative path whenever it was reached, even if
        // a recovery also fired for the same content.
        let path = if quorum {
            CompletionPath::Quorum
        } else {
            CompletionPath::Recovery
        };
        let completed = PayloadLedger::new(stores.payloads.as_mut()).complete(
            payload_id,
            position,
            summary.any_failed,
            path,
            meta,
        )?;
        if completed.is_some() {
            if quorum {
                metrics::QUORUM_CONFIRMATIONS.inc();
            }
            let label = match path {
                CompletionPath::Quorum => "quorum",
                CompletionPath::Recovery => "recovery",
            };
            metrics::PAYLOADS_COMPLETED.with_label_values(&[label]).inc();
            if summary.any_failed {
                metrics::PAYLOADS_PARTIALLY_FAILED.inc();
            }
        }
        Ok(())
    }
}

fn decode_failure_reason(error: &CodecError) -> &'static str {
    match error {
        CodecError::UnknownDiscriminator { .. } => "unknown_kind",
        CodecError::Truncated { .. } => "truncated",
        CodecError::TrailingBytes { .. } => "trailing",
    }
}

#[async_trait]
impl LifecycleApi for LifecycleService {
    async fn apply(&self, event: ObservationEvent) -> LifecycleResult<()> {
        debug!(event = event.name(), block = event.meta().block_number, "applying observation");
        let mut stores = self.state.write();
        match event {
            ObservationEvent::MessagePrepared {
                source,
                dest,
                raw_message,
                meta,
            } => self.handle_message_prepared(&mut stores, source, dest, raw_message, meta),
            ObservationEvent::BatchSent {
                source,
                dest,
                raw_batch,
                adapter,
                kind,
                meta,
            } => {
                let payload =
                    self.handle_batch_send(&mut stores, source, dest, raw_batch, false, meta)?;
                if let Some(payload) = payload {
                    self.record_participation(
                        &mut stores,
                        &payload,
                        adapter,
                        ParticipationSide::Send,
                        kind,
                        meta,
                    )?;
                }
                Ok(())
            }
            ObservationEvent::BatchUnderpaid {
                source,
                dest,
                raw_batch,
                meta,
            } => self
                .handle_batch_send(&mut stores, source, dest, raw_batch, true, meta)
                .map(|_| ()),
            ObservationEvent::BatchRepaid {
                payload_id, meta, ..
            } => PayloadLedger::new(stores.payloads.as_mut())
                .mark_repaid(&payload_id, meta)
                .map(|_| ()),
            ObservationEvent::BatchHandled {
                payload_id,
                adapter,
                kind,
                meta,
                ..
            } => self.handle_batch_handled(&mut stores, payload_id, adapter, kind, meta),
            ObservationEvent::MessageExecuted {
                message_id,
                payload_id,
                meta,
                ..
            } => self.handle_message_terminal(&mut stores, message_id, payload_id, false, meta),
            ObservationEvent::MessageFailed {
                message_id,
                payload_id,
                meta,
                ..
            } => self.handle_message_terminal(&mut stores, message_id, payload_id, true, meta),
            ObservationEvent::RecoveryInitiated {
                dest,
                adapter,
                payload_hash,
                meta,
            } => {
                let opened = RecoveryCoordinator::new(
                    stores.recoveries.as_mut(),
                    self.config.challenge_period_secs,
                )
                .observe_initiated(dest, adapter, payload_hash, meta)?;
                if opened.is_some() {
                    metrics::RECOVERIES_INITIATED.inc();
                }
                Ok(())
            }
            ObservationEvent::RecoveryDisputed {
                dest,
                adapter,
                payload_hash,
                meta,
            } => {
                let disputed = RecoveryCoordinator::new(
                    stores.recoveries.as_mut(),
                    self.config.challenge_period_secs,
                )
                .observe_disputed(dest, &adapter, &payload_hash, meta)?;
                if disputed.is_some() {
                    metrics::RECOVERIES_DISPUTED.inc();
                }
                Ok(())
            }
            ObservationEvent::RecoveryExecuted {
                dest,
                adapter,
                payload_hash,
                meta,
            } => self.handle_recovery_executed(&mut stores, dest, adapter, payload_hash, meta),
        }
    }

    async fn message_instances(&self, id: &Hash) -> LifecycleResult<Vec<Message>> {
        self.state.read().messages.instances(id)
    }

    async fn payload_instances(&self, id: &Hash) -> LifecycleResult<Vec<Payload>> {
        self.state.read().payloads.instances(id)
    }

    async fn participation_for(
        &self,
        payload_id: &Hash,
        position: u64,
    ) -> LifecycleResult<Vec<AdapterParticipation>> {
        self.state.read().participations.for_instance(payload_id, position)
    }

    async fn recovery_attempt(
        &self,
        dest: NetworkId,
        adapter: &AdapterId,
        payload_hash: &Hash,
    ) -> LifecycleResult<Option<RecoveryAttempt>> {
        self.state.read().recoveries.get(dest, adapter, payload_hash)
    }
}
