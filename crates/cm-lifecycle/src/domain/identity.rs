//! # Identity Hasher
//!
//! Content-addressed identifier derivation.
//!
//! `message_id = H(src_be8 ‖ dst_be8 ‖ raw_message_bytes)` and
//! `payload_id = H(src_be8 ‖ dst_be8 ‖ H(raw_payload_bytes))` where `H` is
//! keccak256 and network ids hash as 8-byte big-endian.
//!
//! These identifiers are content-addressed, **not** globally unique: two
//! independent sends of byte-identical content between the same network pair
//! collide. That is protocol behavior; position indices (see
//! `domain::pending`) disambiguate.

use sha3::{Digest, Keccak256};
use shared_types::{Hash, NetworkId};

/// Derives deterministic identifiers for messages and payloads.
pub struct IdentityHasher;

impl IdentityHasher {
    /// Compute keccak256 of raw bytes.
    pub fn keccak256(data: &[u8]) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Content id of a single message traveling `source -> dest`.
    pub fn message_id(source: NetworkId, dest: NetworkId, raw_message: &[u8]) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(source.be_bytes());
        hasher.update(dest.be_bytes());
        hasher.update(raw_message);
        hasher.finalize().into()
    }

    /// Content id of a payload (batch) traveling `source -> dest`.
    ///
    /// The payload bytes are pre-hashed, matching the on-chain contracts
    /// which only ever see the batch hash on the destination side.
    pub fn payload_id(source: NetworkId, dest: NetworkId, raw_bytes: &[u8]) -> Hash {
        let content = Self::keccak256(raw_bytes);
        let mut hasher = Keccak256::new();
        hasher.update(source.be_bytes());
        hasher.update(dest.be_bytes());
        hasher.update(content);
        hasher.finalize().into()
    }

    /// Bare content hash of payload bytes, the key used by the recovery path
    /// (which runs on the destination network and never sees the source id).
    pub fn payload_content_hash(raw_bytes: &[u8]) -> Hash {
        Self::keccak256(raw_bytes)
    }
}
