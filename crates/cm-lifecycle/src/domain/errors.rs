//! # Domain Errors
//!
//! Error types for the lifecycle engine.

use crate::codec::CodecError;
use shared_types::Hash;
use thiserror::Error;

/// Lifecycle engine errors.
///
/// Missing cross-references are deliberately *not* errors: under
/// at-least-once multi-network delivery, a handle-side event can arrive
/// before its send-side counterpart has been processed. Those paths log a
/// warning and skip instead.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// Wire decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A state transition that the state machine forbids was attempted.
    /// Fatal for the offending record only.
    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Entity the transition was attempted on.
        entity: &'static str,
        /// Current state.
        from: String,
        /// Attempted state.
        to: String,
    },

    /// A field that is set exactly once was set twice with different values.
    #[error("Conflicting link for message {message:?}: already linked to another payload instance")]
    ConflictingLink {
        /// Message content id.
        message: Hash,
    },

    /// Persistence layer failure.
    #[error("Store error: {reason}")]
    Store {
        /// Underlying failure description.
        reason: String,
    },

    /// Wire-event normalization failure.
    #[error("Malformed wire event: {reason}")]
    MalformedEvent {
        /// What was wrong with the event.
        reason: String,
    },
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
