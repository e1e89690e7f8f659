//! # cm-lifecycle
//!
//! Lifecycle reconstruction engine for the CrossMesh asset-transfer protocol.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Many blockchain networks emit events independently as protocol messages
//! and payloads (batches of messages) move between them. This crate
//! reconstructs, from that partially-ordered multi-source stream, the
//! authoritative lifecycle of every message and payload:
//!
//! - Content-addressed identity derivation (keccak256 over network pair +
//!   content)
//! - Binary message/batch decoding with a per-kind length table
//! - Multi-adapter quorum confirmation on the destination network
//! - A time-windowed dispute/recovery fallback that bypasses quorum
//!
//! Identity hashes intentionally collide for byte-identical content between
//! the same network pair; positional FIFO matching disambiguates concurrent
//! in-flight instances.
//!
//! ## Module Structure
//!
//! ```text
//! cm-lifecycle/
//! ├── codec/       # Wire format: typed bodies, batch splitting
//! ├── domain/      # Entities, state machines, identity, ledgers, quorum, recovery
//! ├── events/      # Canonical observation events + versioned normalization
//! ├── ports/       # LifecycleApi (inbound), store traits (outbound)
//! ├── adapters/    # In-memory reference stores
//! └── service.rs   # LifecycleService composition root
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cm_lifecycle::{LifecycleConfig, LifecycleService};
//! use cm_lifecycle::ports::inbound::LifecycleApi;
//!
//! let service = LifecycleService::in_memory(LifecycleConfig::default());
//! service.apply(event).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// Re-exports
pub use codec::{split_batch, BatchSplit, CodecError, MessageBody, RawMessage};
pub use domain::{
    AdapterParticipation, CompletionPath, LifecycleError, LifecycleResult, Message, MessageKind,
    MessageStatus, ParticipationKind, ParticipationSide, Payload, PayloadStatus, RecoveryAttempt,
    RecoveryStatus, CHALLENGE_PERIOD_SECS,
};
pub use events::ObservationEvent;
pub use service::{LifecycleConfig, LifecycleService, QuorumConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
