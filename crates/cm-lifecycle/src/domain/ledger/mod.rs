//! # Ledgers
//!
//! Per-entity lifecycle owners: `MessageLedger` for message state and the
//! message→payload linkage, `PayloadLedger` for payload state including the
//! underpayment/repayment path.
//!
//! Ledgers borrow their store port for the duration of one event
//! application; the service's store lock is the serialization point.

pub mod message;
pub mod payload;

pub use message::{MessageLedger, TerminalSummary};
pub use payload::PayloadLedger;
