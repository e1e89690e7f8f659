//! Dispute/recovery fallback.
//!
//! When quorum cannot be reached (an adapter set went offline, a proof never
//! arrived), anyone may initiate a recovery on the destination network. The
//! attempt opens a challenge window; if nobody disputes it before the window
//! elapses, executing it force-delivers the payload without quorum.
//!
//! All timing uses event timestamps. Wall-clock time never enters the
//! decision, so replaying a historical event log reproduces identical state.

use crate::domain::entities::RecoveryAttempt;
use crate::domain::errors::{LifecycleError, LifecycleResult};
use crate::domain::value_objects::RecoveryStatus;
use crate::ports::outbound::RecoveryStore;
use shared_types::{short_hex, AdapterId, EventMeta, Hash, NetworkId};
use tracing::{debug, warn};

/// Seconds a recovery attempt must sit undisputed before it may execute.
pub const CHALLENGE_PERIOD_SECS: u64 = 86_400;

/// Owns recovery-attempt state keyed by
/// `(dest_network, adapter_id, payload_hash)`.
pub struct RecoveryCoordinator<'a> {
    store: &'a mut dyn RecoveryStore,
    challenge_period_secs: u64,
}

impl<'a> RecoveryCoordinator<'a> {
    /// Wrap a store for one event application.
    pub fn new(store: &'a mut dyn RecoveryStore, challenge_period_secs: u64) -> Self {
        Self {
            store,
            challenge_period_secs,
        }
    }

    /// Open (or re-arm) a challenge window.
    ///
    /// A key whose previous attempt was `Disputed` may be initiated again
    /// with a fresh window. An attempt already `Initiated` or `Executed`
    /// under the same key absorbs the event as a replay.
    pub fn observe_initiated(
        &mut self,
        dest: NetworkId,
        adapter: AdapterId,
        payload_hash: Hash,
        meta: EventMeta,
    ) -> LifecycleResult<Option<RecoveryAttempt>> {
        if let Some(existing) = self.store.get(dest, &adapter, &payload_hash)? {
            match existing.status {
                RecoveryStatus::Disputed => {
                    debug!(
                        payload_hash = %short_hex(&payload_hash),
                        "re-arming recovery after dispute"
                    );
                }
                RecoveryStatus::Initiated | RecoveryStatus::Executed => {
                    debug!(payload_hash = %short_hex(&payload_hash), "recovery initiation replay");
                    return Ok(None);
                }
            }
        }
        let attempt = RecoveryAttempt::new(dest, adapter, payload_hash, meta);
        self.store.upsert(attempt.clone())?;
        Ok(Some(attempt))
    }

    /// Record a dispute, closing the window for this attempt.
    pub fn observe_disputed(
        &mut self,
        dest: NetworkId,
        adapter: &AdapterId,
        payload_hash: &Hash,
        meta: EventMeta,
    ) -> LifecycleResult<Option<RecoveryAttempt>> {
        let Some(mut attempt) = self.store.get(dest, adapter, payload_hash)? else {
            warn!(payload_hash = %short_hex(payload_hash), "dispute for unknown recovery");
            return Ok(None);
        };
        if attempt
            .resolved
            .map(|r| r.same_emission(&meta))
            .unwrap_or(false)
        {
            debug!(payload_hash = %short_hex(payload_hash), "dispute replay");
            return Ok(None);
        }
        if let Err(e @ LifecycleError::InvalidTransition { .. }) =
            attempt.resolve(RecoveryStatus::Disputed, meta)
        {
            warn!(payload_hash = %short_hex(payload_hash), %e, "dropping out-of-order dispute");
            return Ok(None);
        }
        self.store.upsert(attempt.clone())?;
        Ok(Some(attempt))
    }

    /// Record an execution observed on-network.
    ///
    /// Valid only if the attempt is still `Initiated` and the challenge
    /// period has elapsed at the event's timestamp. Returns the executed
    /// attempt so the caller can force-deliver matching payload instances.
    pub fn observe_executed(
        &mut self,
        dest: NetworkId,
        adapter: &AdapterId,
        payload_hash: &Hash,
        meta: EventMeta,
    ) -> LifecycleResult<Option<RecoveryAttempt>> {
        let Some(mut attempt) = self.store.get(dest, adapter, payload_hash)? else {
            warn!(payload_hash = %short_hex(payload_hash), "execution for unknown recovery");
            return Ok(None);
        };
        if attempt
            .resolved
            .map(|r| r.same_emission(&meta))
            .unwrap_or(false)
        {
            debug!(payload_hash = %short_hex(payload_hash), "execution replay");
            return Ok(None);
        }
        if !attempt.challenge_elapsed(meta.timestamp, self.challenge_period_secs) {
            warn!(
                payload_hash = %short_hex(payload_hash),
                initiated_at = attempt.initiated_at,
                executed_at = meta.timestamp,
                "recovery executed before challenge period elapsed; dropping"
            );
            return Ok(None);
        }
        if let Err(e @ LifecycleError::InvalidTransition { .. }) =
            attempt.resolve(RecoveryStatus::Executed, meta)
        {
            warn!(payload_hash = %short_hex(payload_hash), %e, "dropping invalid recovery execution");
            return Ok(None);
        }
        self.store.upsert(attempt.clone())?;
        Ok(Some(attempt))
    }
}
