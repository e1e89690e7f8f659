//! # Adapters Module
//!
//! Reference implementations of the outbound store ports. The in-memory
//! stores back the default service composition and the test suites.

pub mod memory;

pub use memory::{
    InMemoryMessageStore, InMemoryParticipationStore, InMemoryPayloadStore, InMemoryRecoveryStore,
};
