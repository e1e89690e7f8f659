//! Shared test fixtures: wire builders, emission metadata, and a scripted
//! event-log runner.

use cm_lifecycle::domain::IdentityHasher;
use cm_lifecycle::ports::inbound::LifecycleApi;
use cm_lifecycle::{
    LifecycleConfig, LifecycleService, MessageBody, ObservationEvent, ParticipationKind,
};
use shared_types::{AdapterId, EventMeta, Hash, NetworkId};

pub const SRC: NetworkId = NetworkId(1);
pub const DST: NetworkId = NetworkId(2);
pub const ADAPTER_A: AdapterId = [0xA1; 20];
pub const ADAPTER_B: AdapterId = [0xB2; 20];
pub const ADAPTER_C: AdapterId = [0xC3; 20];

/// Distinct emission: `tx` disambiguates, `ts` is the block timestamp.
pub fn meta(ts: u64, tx: u8) -> EventMeta {
    EventMeta {
        block_number: ts,
        timestamp: ts,
        tx_hash: [tx; 32],
        log_index: 0,
    }
}

pub fn deposit(assets: u128) -> MessageBody {
    MessageBody::Deposit {
        recipient: [0x11; 32],
        token: [0x22; 16],
        assets,
    }
}

pub fn redeem(shares: u128) -> MessageBody {
    MessageBody::Redeem {
        holder: [0x33; 32],
        shares,
        min_assets: 0,
    }
}

pub fn rate_sync(observed_at: u64) -> MessageBody {
    MessageBody::RateSync {
        total_assets: 1_000_000,
        total_shares: 900_000,
        observed_at,
    }
}

/// Concatenate message wire bytes into one batch.
pub fn batch(bodies: &[MessageBody]) -> Vec<u8> {
    bodies.iter().flat_map(|b| b.encode()).collect()
}

pub fn message_id(body: &MessageBody) -> Hash {
    IdentityHasher::message_id(SRC, DST, &body.encode())
}

pub fn payload_id(raw_batch: &[u8]) -> Hash {
    IdentityHasher::payload_id(SRC, DST, raw_batch)
}

pub fn service() -> LifecycleService {
    LifecycleService::in_memory(LifecycleConfig::default())
}

/// Apply a whole observation log in order.
pub async fn apply_log(service: &LifecycleService, log: &[ObservationEvent]) {
    for event in log {
        service
            .apply(event.clone())
            .await
            .unwrap_or_else(|e| panic!("event {} failed: {e}", event.name()));
    }
}

/// The standard full-lifecycle log for one batch: prepares, paid send via
/// adapter A, handles by A (payload) and B (proof), then execution of every
/// message. Timestamps and tx hashes start at `t0`/`tx0` and increase.
pub fn happy_log(bodies: &[MessageBody], t0: u64, tx0: u8) -> Vec<ObservationEvent> {
    let raw = batch(bodies);
    let pid = payload_id(&raw);
    let mut log = Vec::new();
    let mut tx = tx0;

    for body in bodies {
        log.push(ObservationEvent::MessagePrepared {
            source: SRC,
            dest: DST,
            raw_message: body.encode(),
            meta: meta(t0, tx),
        });
        tx += 1;
    }
    log.push(ObservationEvent::BatchSent {
        source: SRC,
        dest: DST,
        raw_batch: raw,
        adapter: ADAPTER_A,
        kind: ParticipationKind::Payload,
        meta: meta(t0 + 1, tx),
    });
    tx += 1;
    log.push(ObservationEvent::BatchHandled {
        source: SRC,
        dest: DST,
        payload_id: pid,
        adapter: ADAPTER_A,
        kind: ParticipationKind::Payload,
        meta: meta(t0 + 2, tx),
    });
    tx += 1;
    log.push(ObservationEvent::BatchHandled {
        source: SRC,
        dest: DST,
        payload_id: pid,
        adapter: ADAPTER_B,
        kind: ParticipationKind::Proof,
        meta: meta(t0 + 3, tx),
    });
    tx += 1;
    for body in bodies {
        log.push(ObservationEvent::MessageExecuted {
            dest: DST,
            message_id: message_id(body),
            payload_id: pid,
            meta: meta(t0 + 4, tx),
        });
        tx += 1;
    }
    log
}
