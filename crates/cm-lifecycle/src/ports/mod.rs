//! # Ports Module
//!
//! Hexagonal boundaries: the inbound `LifecycleApi` driven by the
//! network-watching layer, and the outbound store traits implemented by the
//! persistence layer.

pub mod inbound;
pub mod outbound;

pub use inbound::LifecycleApi;
pub use outbound::{MessageStore, ParticipationStore, PayloadStore, RecoveryStore};
