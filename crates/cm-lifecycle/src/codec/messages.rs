//! Typed message bodies and their lossless encode/decode.
//!
//! Decoding is the inverse of encoding for every kind:
//! `decode(encode(m)) == m`.

use super::wire::{ByteReader, ByteWriter};
use super::CodecError;
use crate::domain::value_objects::MessageKind;
use serde::{Deserialize, Serialize};

/// A fully decoded protocol message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    /// Asset deposit instruction.
    Deposit {
        /// Recipient account on the destination network.
        recipient: [u8; 32],
        /// Token identifier.
        token: [u8; 16],
        /// Asset amount.
        assets: u128,
    },
    /// Share redemption instruction.
    Redeem {
        /// Redeeming account.
        holder: [u8; 32],
        /// Shares to burn.
        shares: u128,
        /// Minimum acceptable asset amount.
        min_assets: u128,
    },
    /// Exchange-rate synchronization.
    RateSync {
        /// Total assets on the source network.
        total_assets: u128,
        /// Total shares on the source network.
        total_shares: u128,
        /// Source-side observation timestamp.
        observed_at: u64,
    },
    /// Epoch rollover marker.
    EpochRollover {
        /// Protocol flags.
        flags: u8,
        /// New epoch number.
        epoch: u64,
    },
    /// Account restriction update; payload size is caller-defined.
    Restriction {
        /// Restricted account.
        account: [u8; 32],
        /// Caller-defined restriction payload.
        data: Vec<u8>,
    },
    /// Contract upgrade announcement; payload size is caller-defined.
    ContractUpgrade {
        /// Target contract.
        target: [u8; 32],
        /// New contract version.
        version: u16,
        /// Caller-defined upgrade payload.
        data: Vec<u8>,
    },
    /// Governance request; payload size is caller-defined.
    GovernanceRequest {
        /// Request correlation id.
        request_id: [u8; 16],
        /// Request kind tag.
        request_kind: u8,
        /// Caller-defined request payload.
        data: Vec<u8>,
    },
}

impl MessageBody {
    /// Wire kind of this body.
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Deposit { .. } => MessageKind::Deposit,
            MessageBody::Redeem { .. } => MessageKind::Redeem,
            MessageBody::RateSync { .. } => MessageKind::RateSync,
            MessageBody::EpochRollover { .. } => MessageKind::EpochRollover,
            MessageBody::Restriction { .. } => MessageKind::Restriction,
            MessageBody::ContractUpgrade { .. } => MessageKind::ContractUpgrade,
            MessageBody::GovernanceRequest { .. } => MessageKind::GovernanceRequest,
        }
    }

    /// Encode to full wire bytes (discriminator + body).
    ///
    /// Dynamic payloads longer than `u16::MAX` cannot be represented on the
    /// wire; callers construct bodies from decoded wire data, so the bound
    /// holds by construction.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_u8(self.kind().discriminant());
        match self {
            MessageBody::Deposit {
                recipient,
                token,
                assets,
            } => {
                w.put_bytes(recipient);
                w.put_bytes(token);
                w.put_u128(*assets);
            }
            MessageBody::Redeem {
                holder,
                shares,
                min_assets,
            } => {
                w.put_bytes(holder);
                w.put_u128(*shares);
                w.put_u128(*min_assets);
            }
            MessageBody::RateSync {
                total_assets,
                total_shares,
                observed_at,
            } => {
                w.put_u128(*total_assets);
                w.put_u128(*total_shares);
                w.put_u64(*observed_at);
            }
            MessageBody::EpochRollover { flags, epoch } => {
                w.put_u8(*flags);
                w.put_u64(*epoch);
            }
            MessageBody::Restriction { account, data } => {
                debug_assert!(data.len() <= u16::MAX as usize);
                w.put_bytes(account);
                w.put_u16(data.len() as u16);
                w.put_bytes(data);
            }
            MessageBody::ContractUpgrade {
                target,
                version,
                data,
            } => {
                debug_assert!(data.len() <= u16::MAX as usize);
                w.put_bytes(target);
                w.put_u16(*version);
                w.put_u16(data.len() as u16);
                w.put_bytes(data);
            }
            MessageBody::GovernanceRequest {
                request_id,
                request_kind,
                data,
            } => {
                debug_assert!(data.len() <= u16::MAX as usize);
                w.put_bytes(request_id);
                w.put_u8(*request_kind);
                w.put_u16(data.len() as u16);
                w.put_bytes(data);
            }
        }
        w.into_bytes()
    }

    /// Decode one complete message from full wire bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(bytes);
        let disc = r.read_u8()?;
        let kind = MessageKind::from_discriminant(disc).ok_or(
            CodecError::UnknownDiscriminator {
                offset: 0,
                discriminator: disc,
            },
        )?;
        let body = Self::decode_fields(kind, &mut r)?;
        if r.remaining() > 0 {
            return Err(CodecError::TrailingBytes {
                offset: r.offset(),
                count: r.remaining(),
            });
        }
        Ok(body)
    }

    /// Decode a body of a known kind (bytes exclude the discriminator).
    pub fn decode_body(kind: MessageKind, body: &[u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(body);
        let decoded = Self::decode_fields(kind, &mut r)?;
        if r.remaining() > 0 {
            return Err(CodecError::TrailingBytes {
                offset: r.offset(),
                count: r.remaining(),
            });
        }
        Ok(decoded)
    }

    fn decode_fields(kind: MessageKind, r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        match kind {
            MessageKind::Deposit => Ok(MessageBody::Deposit {
                recipient: r.read_array::<32>()?,
                token: r.read_array::<16>()?,
                assets: r.read_u128()?,
            }),
            MessageKind::Redeem => Ok(MessageBody::Redeem {
                holder: r.read_array::<32>()?,
                shares: r.read_u128()?,
                min_assets: r.read_u128()?,
            }),
            MessageKind::RateSync => Ok(MessageBody::RateSync {
                total_assets: r.read_u128()?,
                total_shares: r.read_u128()?,
                observed_at: r.read_u64()?,
            }),
            MessageKind::EpochRollover => Ok(MessageBody::EpochRollover {
                flags: r.read_u8()?,
                epoch: r.read_u64()?,
            }),
            MessageKind::Restriction => {
                let account = r.read_array::<32>()?;
                let len = r.read_u16()? as usize;
                Ok(MessageBody::Restriction {
                    account,
                    data: r.read_bytes(len)?,
                })
            }
            MessageKind::ContractUpgrade => {
                let target = r.read_array::<32>()?;
                let version = r.read_u16()?;
                let len = r.read_u16()? as usize;
                Ok(MessageBody::ContractUpgrade {
                    target,
                    version,
                    data: r.read_bytes(len)?,
                })
            }
            MessageKind::GovernanceRequest => {
                let request_id = r.read_array::<16>()?;
                let request_kind = r.read_u8()?;
                let len = r.read_u16()? as usize;
                Ok(MessageBody::GovernanceRequest {
                    request_id,
                    request_kind,
                    data: r.read_bytes(len)?,
                })
            }
        }
    }
}
