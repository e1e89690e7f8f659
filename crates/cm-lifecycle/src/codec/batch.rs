//! Batch splitting.
//!
//! A batch is the concatenation of complete messages with no separators. The
//! splitter walks the buffer, deriving each message's total length from its
//! kind's length rule, and slices out `discriminator + body` per message.
//!
//! An unknown discriminator or a truncated tail makes the remaining offsets
//! unrecoverable: splitting stops there, the error is reported alongside the
//! messages already split, and the caller decides what to do with the
//! partial result. Splitting never panics.

use super::CodecError;
use crate::domain::value_objects::{BodyRule, MessageKind};

/// One message sliced out of a batch: its kind plus the full wire bytes
/// (discriminator included), exactly as they appeared in the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMessage {
    /// Decoded kind discriminator.
    pub kind: MessageKind,
    /// Full wire bytes of this message.
    pub bytes: Vec<u8>,
}

/// Result of splitting a batch: every message sliced before the first
/// unrecoverable error, plus that error if one occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSplit {
    /// Messages split in batch order.
    pub messages: Vec<RawMessage>,
    /// The error that stopped splitting, if any.
    pub error: Option<CodecError>,
}

impl BatchSplit {
    /// Whether the whole batch was split cleanly.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Split a batch into its constituent messages.
pub fn split_batch(batch: &[u8]) -> BatchSplit {
    let mut messages = Vec::new();
    let mut offset = 0usize;

    while offset < batch.len() {
        let disc = batch[offset];
        let kind = match MessageKind::from_discriminant(disc) {
            Some(kind) => kind,
            None => {
                return BatchSplit {
                    messages,
                    error: Some(CodecError::UnknownDiscriminator {
                        offset,
                        discriminator: disc,
                    }),
                };
            }
        };

        let body_len = match body_length(kind, batch, offset) {
            Ok(len) => len,
            Err(error) => {
                return BatchSplit {
                    messages,
                    error: Some(error),
                };
            }
        };

        let total = 1 + body_len;
        if batch.len() - offset < total {
            return BatchSplit {
                messages,
                error: Some(CodecError::Truncated {
                    offset,
                    needed: total - (batch.len() - offset),
                }),
            };
        }

        messages.push(RawMessage {
            kind,
            bytes: batch[offset..offset + total].to_vec(),
        });
        offset += total;
    }

    BatchSplit {
        messages,
        error: None,
    }
}

/// Total body length of the message starting at `offset`, per its kind's
/// length rule. For dynamic kinds this reads the 2-byte big-endian length
/// field that follows the fixed prefix.
fn body_length(kind: MessageKind, batch: &[u8], offset: usize) -> Result<usize, CodecError> {
    match kind.body_rule() {
        BodyRule::Fixed(n) => Ok(n),
        BodyRule::Dynamic { prefix } => {
            let len_at = offset + 1 + prefix;
            if batch.len() < len_at + 2 {
                return Err(CodecError::Truncated {
                    offset,
                    needed: len_at + 2 - batch.len(),
                });
            }
            let declared = u16::from_be_bytes([batch[len_at], batch[len_at + 1]]) as usize;
            Ok(prefix + 2 + declared)
        }
    }
}
