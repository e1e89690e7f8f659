//! # Domain Module
//!
//! Core domain types and state machines for lifecycle reconstruction.

pub mod entities;
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod pending;
pub mod quorum;
pub mod recovery;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use identity::IdentityHasher;
pub use ledger::{MessageLedger, PayloadLedger};
pub use pending::{next_position, oldest_matching, Positioned};
pub use quorum::AdapterQuorumTracker;
pub use recovery::{RecoveryCoordinator, CHALLENGE_PERIOD_SECS};
pub use value_objects::*;
