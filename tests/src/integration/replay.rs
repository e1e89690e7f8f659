//! At-least-once delivery invariants.
//!
//! Watchers re-emit on reconnect, so every observation can arrive any number
//! of times. Applying a full event log twice must leave reconstructed state
//! byte-identical to applying it once.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cm_lifecycle::ports::inbound::LifecycleApi;
    use cm_lifecycle::{LifecycleService, ObservationEvent, PayloadStatus};
    use shared_types::Hash;

    async fn state_snapshot(
        service: &LifecycleService,
        pid: &Hash,
        mids: &[Hash],
    ) -> String {
        let mut out = format!("{:?}", service.payload_instances(pid).await.unwrap());
        for mid in mids {
            out.push_str(&format!("{:?}", service.message_instances(mid).await.unwrap()));
        }
        out.push_str(&format!(
            "{:?}",
            service.participation_for(pid, 0).await.unwrap().len()
        ));
        out
    }

    #[tokio::test]
    async fn test_double_application_is_identity() {
        let service = service();
        let bodies = [deposit(500), redeem(200)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);
        let mids: Vec<Hash> = bodies.iter().map(message_id).collect();

        let log = happy_log(&bodies, 100, 1);
        apply_log(&service, &log).await;
        let once = state_snapshot(&service, &pid, &mids).await;

        apply_log(&service, &log).await;
        let twice = state_snapshot(&service, &pid, &mids).await;
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_interleaved_duplicates_are_absorbed() {
        // Each event immediately followed by its own duplicate.
        let service = service();
        let bodies = [deposit(500)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);

        for event in happy_log(&bodies, 100, 1) {
            service.apply(event.clone()).await.unwrap();
            service.apply(event).await.unwrap();
        }

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads.len(), 1, "duplicates must not create instances");
        assert_eq!(payloads[0].status, PayloadStatus::Completed);
        let messages = service.message_instances(&message_id(&bodies[0])).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_differs_from_new_emission() {
        // The same bytes from a *different* emission is a genuinely new
        // transfer, not a replay.
        let service = service();
        let raw = batch(&[deposit(500)]);
        let pid = payload_id(&raw);

        let send = |tx: u8| ObservationEvent::BatchUnderpaid {
            source: SRC,
            dest: DST,
            raw_batch: raw.clone(),
            meta: meta(10, tx),
        };
        service.apply(send(1)).await.unwrap();
        service.apply(send(1)).await.unwrap(); // replay
        service.apply(send(2)).await.unwrap(); // new transfer

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads.len(), 2);
    }

    #[tokio::test]
    async fn test_replayed_execution_never_touches_younger_instance() {
        use cm_lifecycle::{MessageStatus, ParticipationKind};

        let service = service();
        let bodies = [deposit(500)];
        let raw = batch(&bodies);
        let mid = message_id(&bodies[0]);

        // Instance 0 runs to completion.
        let log = happy_log(&bodies, 100, 1);
        apply_log(&service, &log).await;

        // Identical content in flight as instance 1.
        apply_log(
            &service,
            &[
                ObservationEvent::MessagePrepared {
                    source: SRC,
                    dest: DST,
                    raw_message: bodies[0].encode(),
                    meta: meta(200, 10),
                },
                ObservationEvent::BatchSent {
                    source: SRC,
                    dest: DST,
                    raw_batch: raw,
                    adapter: ADAPTER_A,
                    kind: ParticipationKind::Payload,
                    meta: meta(201, 11),
                },
            ],
        )
        .await;

        // Instance 0's execution emission arrives again. It resolves to the
        // open instance 1 now, but must be absorbed as a replay.
        let executed = log
            .iter()
            .find(|e| matches!(e, ObservationEvent::MessageExecuted { .. }))
            .unwrap();
        service.apply(executed.clone()).await.unwrap();

        let messages = service.message_instances(&mid).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].status, MessageStatus::Executed);
        assert_eq!(
            messages[1].status,
            MessageStatus::AwaitingBatchDelivery,
            "replayed terminal emission must not execute the second instance"
        );
    }

    #[tokio::test]
    async fn test_replayed_recovery_execution_single_force_delivery() {
        use cm_lifecycle::domain::{IdentityHasher, CHALLENGE_PERIOD_SECS};
        use cm_lifecycle::ParticipationKind;

        let service = service();
        let raw = batch(&[deposit(9)]);
        let pid = payload_id(&raw);
        let content_hash = IdentityHasher::payload_content_hash(&raw);

        service
            .apply(ObservationEvent::BatchSent {
                source: SRC,
                dest: DST,
                raw_batch: raw,
                adapter: ADAPTER_A,
                kind: ParticipationKind::Payload,
                meta: meta(100, 1),
            })
            .await
            .unwrap();
        service
            .apply(ObservationEvent::RecoveryInitiated {
                dest: DST,
                adapter: ADAPTER_A,
                payload_hash: content_hash,
                meta: meta(200, 2),
            })
            .await
            .unwrap();
        let executed = ObservationEvent::RecoveryExecuted {
            dest: DST,
            adapter: ADAPTER_A,
            payload_hash: content_hash,
            meta: meta(200 + CHALLENGE_PERIOD_SECS, 3),
        };
        service.apply(executed.clone()).await.unwrap();
        service.apply(executed).await.unwrap();

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].status, PayloadStatus::Delivered);
        assert!(payloads[0].recovered);
    }
}
