//! Message lifecycle ledger.
//!
//! Lookup misses here are warnings, not errors: with at-least-once delivery
//! across independent network streams, a handle-side event can be processed
//! before its send-side counterpart in this run.

use crate::domain::entities::{Message, MessageParams};
use crate::domain::errors::LifecycleResult;
use crate::domain::identity::IdentityHasher;
use crate::domain::pending::{next_position, oldest_matching};
use crate::domain::value_objects::{MessageKind, MessageStatus};
use crate::ports::outbound::MessageStore;
use shared_types::{short_hex, EventMeta, Hash, NetworkId};
use tracing::{debug, warn};

/// Terminal-state summary for all messages linked to one payload instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalSummary {
    /// Number of linked messages.
    pub total: usize,
    /// Whether every linked message is Executed or Failed.
    pub all_terminal: bool,
    /// Whether at least one linked message is Failed.
    pub any_failed: bool,
}

/// Owns per-message lifecycle state and the message→payload linkage.
pub struct MessageLedger<'a> {
    store: &'a mut dyn MessageStore,
}

impl<'a> MessageLedger<'a> {
    /// Wrap a store for one event application.
    pub fn new(store: &'a mut dyn MessageStore) -> Self {
        Self { store }
    }

    /// Record a message first observed being prepared on its source network.
    ///
    /// Idempotent: if an unlinked instance with the same content id already
    /// exists, this observation is a replay and nothing is created.
    pub fn observe_prepared(
        &mut self,
        source: NetworkId,
        dest: NetworkId,
        kind: MessageKind,
        raw_payload: Vec<u8>,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Message>> {
        let id = IdentityHasher::message_id(source, dest, &raw_payload);
        let instances = self.store.instances(&id)?;
        if instances.iter().any(|m| m.created.same_emission(&meta)) {
            debug!(message = %short_hex(&id), "prepare replay: same emission");
            return Ok(None);
        }
        if instances.iter().any(|m| !m.is_linked()) {
            debug!(message = %short_hex(&id), "prepare absorbed: unlinked instance exists");
            return Ok(None);
        }
        let message = Message::new(MessageParams {
            id,
            position_index: next_position(&instances),
            source_network: source,
            dest_network: dest,
            kind,
            raw_payload,
            created: meta,
        });
        self.store.insert(message.clone())?;
        Ok(Some(message))
    }

    /// Link the oldest unlinked instance of `message_id` to its containing
    /// payload instance. Called once per message when the payload is sent.
    pub fn link_to_payload(
        &mut self,
        message_id: &Hash,
        payload_id: Hash,
        payload_position: u64,
    ) -> LifecycleResult<()> {
        let instances = self.store.instances(message_id)?;
        if instances
            .iter()
            .any(|m| m.is_linked_to(&payload_id, payload_position))
        {
            debug!(message = %short_hex(message_id), "link replay: already linked");
            return Ok(());
        }
        match oldest_matching(&instances, |m| !m.is_linked()) {
            Some(found) => {
                let mut message = found.clone();
                message.link(payload_id, payload_position)?;
                self.store.update(message)
            }
            None => {
                warn!(
                    message = %short_hex(message_id),
                    payload = %short_hex(&payload_id),
                    "no unlinked message to attach to payload; send-side event not yet processed?"
                );
                Ok(())
            }
        }
    }

    /// Mark the matching message instance Executed.
    pub fn mark_executed(
        &mut self,
        message_id: &Hash,
        payload_id: &Hash,
        payload_position: u64,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Message>> {
        self.mark_terminal(message_id, payload_id, payload_position, MessageStatus::Executed, meta)
    }

    /// Mark the matching message instance Failed.
    pub fn mark_failed(
        &mut self,
        message_id: &Hash,
        payload_id: &Hash,
        payload_position: u64,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Message>> {
        self.mark_terminal(message_id, payload_id, payload_position, MessageStatus::Failed, meta)
    }

    fn mark_terminal(
        &mut self,
        message_id: &Hash,
        payload_id: &Hash,
        payload_position: u64,
        next: MessageStatus,
        meta: EventMeta,
    ) -> LifecycleResult<Option<Message>> {
        let instances = self.store.instances(message_id)?;

        // Replay: this exact observation already made some instance terminal.
        // Checked across every instance of the content id, not only those in
        // the resolved payload instance; a late duplicate must never spill
        // onto a younger colliding instance.
        if instances
            .iter()
            .any(|m| m.terminal.map(|t| t.same_emission(&meta)).unwrap_or(false))
        {
            debug!(message = %short_hex(message_id), "terminal replay");
            return Ok(None);
        }

        let candidate = instances
            .iter()
            .filter(|m| m.is_linked_to(payload_id, payload_position))
            .filter(|m| m.status == MessageStatus::AwaitingBatchDelivery)
            .min_by_key(|m| m.position_index);

        match candidate {
            Some(found) => {
                let mut message = (*found).clone();
                message.mark_terminal(next, meta)?;
                self.store.update(message.clone())?;
                Ok(Some(message))
            }
            None => {
                warn!(
                    message = %short_hex(message_id),
                    payload = %short_hex(payload_id),
                    position = payload_position,
                    status = ?next,
                    "no awaiting message for terminal transition"
                );
                Ok(None)
            }
        }
    }

    /// Terminal summary for the messages linked to one payload instance.
    ///
    /// A payload with zero linked messages is vacuously all-terminal.
    pub fn terminal_summary(
        &self,
        payload_id: &Hash,
        payload_position: u64,
    ) -> LifecycleResult<TerminalSummary> {
        let linked = self.store.by_payload(payload_id, payload_position)?;
        Ok(TerminalSummary {
            total: linked.len(),
            all_terminal: linked.iter().all(|m| m.status.is_terminal()),
            any_failed: linked.iter().any(|m| m.status == MessageStatus::Failed),
        })
    }

    /// True only if every message linked to the payload instance is terminal.
    pub fn all_terminal(&self, payload_id: &Hash, payload_position: u64) -> LifecycleResult<bool> {
        Ok(self.terminal_summary(payload_id, payload_position)?.all_terminal)
    }
}
