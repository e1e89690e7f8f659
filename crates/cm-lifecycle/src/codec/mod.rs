//! # Message Codec
//!
//! Bit-exact wire format for protocol messages and batches.
//!
//! Each message is a 1-byte kind discriminator followed by a kind-specific
//! body. Bodies are either fixed-length or dynamic-length (a fixed prefix,
//! a 2-byte big-endian length field, then that many bytes of trailing
//! payload). A batch is the concatenation of complete messages with no
//! separators; the only way to split one is to know each kind's length rule.

pub mod batch;
pub mod messages;
pub mod wire;

pub use batch::{split_batch, BatchSplit, RawMessage};
pub use messages::MessageBody;

use thiserror::Error;

/// Wire decoding errors.
///
/// Carried back to the ingestion layer instead of panicking; a malformed
/// batch must never crash event processing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A kind discriminator that no length rule exists for. Remaining batch
    /// offsets are unrecoverable past this point.
    #[error("Unknown message discriminator 0x{discriminator:02x} at offset {offset}")]
    UnknownDiscriminator {
        /// Byte offset of the discriminator within the batch.
        offset: usize,
        /// The observed discriminator byte.
        discriminator: u8,
    },

    /// Input ended before the declared body length.
    #[error("Truncated input at offset {offset}: need {needed} more bytes")]
    Truncated {
        /// Byte offset where reading stopped.
        offset: usize,
        /// How many further bytes the length rule required.
        needed: usize,
    },

    /// A single-message decode left bytes unread; the input was not one
    /// complete message.
    #[error("Unexpected trailing bytes at offset {offset}: {count} bytes left")]
    TrailingBytes {
        /// Offset where the declared fields ended.
        offset: usize,
        /// Number of unread bytes.
        count: usize,
    },
}
