//! # Events Module
//!
//! The canonical observation events the engine consumes, and normalization
//! from the versioned wire JSON the network watchers emit.

pub mod incoming;
pub mod normalize;

pub use incoming::ObservationEvent;
pub use normalize::normalize_event;
