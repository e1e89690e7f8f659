//! # Core Shared Entities
//!
//! Identifier types and observation metadata used by every CrossMesh crate.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `AdapterId`, `NetworkId`
//! - **Audit**: `EventMeta`

use serde::{Deserialize, Serialize};

/// A 32-byte hash (keccak256).
pub type Hash = [u8; 32];

/// A 20-byte adapter address.
///
/// Adapters are on-chain transport contracts; they are identified by their
/// deployment address on the network where the observation was emitted.
pub type AdapterId = [u8; 20];

/// Identifier of one blockchain network participating in the protocol.
///
/// The protocol assigns each network a small integer id. Hashing always uses
/// the 8-byte big-endian form, see `be_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NetworkId(pub u64);

impl NetworkId {
    /// Fixed-width big-endian form used in identity hashing.
    pub fn be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "net-{}", self.0)
    }
}

/// Block/transaction metadata carried by every on-chain observation.
///
/// Event timestamps drive all temporal semantics in the engine (the recovery
/// challenge window in particular); wall-clock time is never consulted, so a
/// replayed event log reproduces identical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventMeta {
    /// Block number on the emitting network.
    pub block_number: u64,
    /// Block timestamp (Unix seconds) on the emitting network.
    pub timestamp: u64,
    /// Hash of the transaction that emitted the event.
    pub tx_hash: Hash,
    /// Log index of the event within the transaction.
    pub log_index: u32,
}

impl EventMeta {
    /// Two observations with the same emission point are the same event.
    ///
    /// At-least-once delivery means the engine may see the same on-chain
    /// occurrence more than once; this is the replay-detection key.
    pub fn same_emission(&self, other: &EventMeta) -> bool {
        self.tx_hash == other.tx_hash && self.log_index == other.log_index
    }
}

/// Render an identifier as a short hex prefix for log lines.
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}
