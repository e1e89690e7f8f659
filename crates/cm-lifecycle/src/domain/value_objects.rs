//! # Domain Value Objects
//!
//! Immutable value types: message kinds with their wire length rules, and
//! the lifecycle state machines for messages, payloads and recovery attempts.

use serde::{Deserialize, Serialize};

/// Protocol message kinds, identified on the wire by a 1-byte discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Asset deposit instruction for the destination network.
    Deposit,
    /// Share redemption instruction.
    Redeem,
    /// Exchange-rate synchronization between networks.
    RateSync,
    /// Epoch rollover marker.
    EpochRollover,
    /// Account restriction update (caller-defined payload).
    Restriction,
    /// Contract upgrade announcement (caller-defined payload).
    ContractUpgrade,
    /// Governance request (caller-defined payload).
    GovernanceRequest,
}

/// Length rule for a message body (everything after the discriminator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyRule {
    /// Body is exactly this many bytes.
    Fixed(usize),
    /// Fixed prefix of this many bytes, then a 2-byte big-endian length `L`,
    /// then `L` bytes of trailing payload.
    Dynamic {
        /// Length of the fixed prefix before the length field.
        prefix: usize,
    },
}

impl MessageKind {
    /// Wire discriminator for this kind.
    pub fn discriminant(&self) -> u8 {
        match self {
            MessageKind::Deposit => 0x01,
            MessageKind::Redeem => 0x02,
            MessageKind::RateSync => 0x03,
            MessageKind::EpochRollover => 0x04,
            MessageKind::Restriction => 0x10,
            MessageKind::ContractUpgrade => 0x11,
            MessageKind::GovernanceRequest => 0x12,
        }
    }

    /// Resolve a wire discriminator. Unknown bytes return `None`; the codec
    /// must stop splitting a batch at that point because remaining offsets
    /// are unrecoverable.
    pub fn from_discriminant(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(MessageKind::Deposit),
            0x02 => Some(MessageKind::Redeem),
            0x03 => Some(MessageKind::RateSync),
            0x04 => Some(MessageKind::EpochRollover),
            0x10 => Some(MessageKind::Restriction),
            0x11 => Some(MessageKind::ContractUpgrade),
            0x12 => Some(MessageKind::GovernanceRequest),
            _ => None,
        }
    }

    /// Body length rule for this kind.
    pub fn body_rule(&self) -> BodyRule {
        match self {
            // recipient [u8;32] + token [u8;16] + assets u128
            MessageKind::Deposit => BodyRule::Fixed(64),
            // holder [u8;32] + shares u128 + min_assets u128
            MessageKind::Redeem => BodyRule::Fixed(64),
            // total_assets u128 + total_shares u128 + observed_at u64
            MessageKind::RateSync => BodyRule::Fixed(40),
            // flags u8 + epoch u64
            MessageKind::EpochRollover => BodyRule::Fixed(9),
            // account [u8;32]
            MessageKind::Restriction => BodyRule::Dynamic { prefix: 32 },
            // target [u8;32] + version u16
            MessageKind::ContractUpgrade => BodyRule::Dynamic { prefix: 34 },
            // request_id [u8;16] + kind u8
            MessageKind::GovernanceRequest => BodyRule::Dynamic { prefix: 17 },
        }
    }

    /// All supported kinds, in discriminator order.
    pub fn all() -> [MessageKind; 7] {
        [
            MessageKind::Deposit,
            MessageKind::Redeem,
            MessageKind::RateSync,
            MessageKind::EpochRollover,
            MessageKind::Restriction,
            MessageKind::ContractUpgrade,
            MessageKind::GovernanceRequest,
        ]
    }
}

/// Message lifecycle state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Created on first observation of prepare; waiting for its containing
    /// payload to be delivered on the destination network.
    #[default]
    AwaitingBatchDelivery,
    /// Executed on the destination network.
    Executed,
    /// Execution attempted and failed on the destination network.
    Failed,
}

impl MessageStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (
                Self::AwaitingBatchDelivery,
                Self::Executed | Self::Failed
            )
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Failed)
    }
}

/// Payload lifecycle state machine. Transitions are monotonic; nothing ever
/// moves a payload backward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadStatus {
    /// Sent with an insufficient fee; waiting for a top-up.
    Underpaid,
    /// Sent (or repaid) and traveling to the destination network.
    #[default]
    InTransit,
    /// Observed as handled on the destination network.
    Delivered,
    /// Quorum confirmed (or recovery executed) and every linked message
    /// terminal with no failures.
    Completed,
    /// Quorum confirmed but one or more linked messages failed.
    PartiallyFailed,
}

impl PayloadStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: PayloadStatus) -> bool {
        match (self, next) {
            (Self::Underpaid, Self::InTransit) => true,
            (Self::InTransit, Self::Delivered) => true,
            (Self::Delivered, Self::Completed) => true,
            (Self::Delivered, Self::PartiallyFailed) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyFailed)
    }
}

/// Which side of the transfer an adapter participation was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipationSide {
    /// Observed on the source network at send time.
    Send,
    /// Observed on the destination network at handle time.
    Handle,
}

/// What the adapter carried: the payload itself, or a proof of its hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipationKind {
    /// The full payload (primary adapter).
    Payload,
    /// A proof of the payload hash (redundant adapter).
    Proof,
}

/// Recovery attempt state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryStatus {
    /// Challenge window open.
    #[default]
    Initiated,
    /// Disputed before the window elapsed; normal quorum path required.
    Disputed,
    /// Window elapsed undisputed; payload force-delivered bypassing quorum.
    Executed,
}

impl RecoveryStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: RecoveryStatus) -> bool {
        matches!(
            (self, next),
            (Self::Initiated, Self::Disputed) | (Self::Initiated, Self::Executed)
        )
    }
}

/// How a payload reached `Completed`/`PartiallyFailed`. Auditors must be able
/// to distinguish degraded-trust recovery completions from quorum ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionPath {
    /// Normal path: adapter quorum confirmed on the destination network.
    Quorum,
    /// Fallback path: recovery executed after an undisputed challenge window.
    Recovery,
}
