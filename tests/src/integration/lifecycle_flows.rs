//! End-to-end lifecycle flows through the whole engine: codec, ledgers,
//! quorum tracking and recovery, driven via the inbound API only.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cm_lifecycle::domain::{IdentityHasher, CHALLENGE_PERIOD_SECS};
    use cm_lifecycle::ports::inbound::LifecycleApi;
    use cm_lifecycle::{
        CompletionPath, MessageStatus, ObservationEvent, ParticipationKind, PayloadStatus,
        RecoveryStatus,
    };

    #[tokio::test]
    async fn test_multi_message_batch_completes_via_quorum() {
        let service = service();
        let bodies = [deposit(500), redeem(200), rate_sync(1_000)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);

        apply_log(&service, &happy_log(&bodies, 100, 1)).await;

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].status, PayloadStatus::Completed);
        assert_eq!(payloads[0].completed_via, Some(CompletionPath::Quorum));

        // Every message linked to instance 0 and executed
        for body in &bodies {
            let instances = service.message_instances(&message_id(body)).await.unwrap();
            assert_eq!(instances.len(), 1);
            assert_eq!(instances[0].status, MessageStatus::Executed);
            assert!(instances[0].is_linked_to(&pid, 0));
        }

        // Send-side and two handle-side participation rows
        let rows = service.participation_for(&pid, 0).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_one_failed_message_partially_fails_batch() {
        let service = service();
        let bodies = [deposit(500), redeem(200)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);

        let mut log = happy_log(&bodies, 100, 1);
        // Replace the redeem's execution with a failure.
        let failed_id = message_id(&bodies[1]);
        for event in &mut log {
            let emission = match event {
                ObservationEvent::MessageExecuted {
                    message_id, meta, ..
                } if *message_id == failed_id => Some(*meta),
                _ => None,
            };
            if let Some(meta) = emission {
                *event = ObservationEvent::MessageFailed {
                    dest: DST,
                    message_id: failed_id,
                    payload_id: pid,
                    meta,
                };
            }
        }
        apply_log(&service, &log).await;

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::PartiallyFailed);
        assert_eq!(payloads[0].completed_via, Some(CompletionPath::Quorum));

        let executed = service.message_instances(&message_id(&bodies[0])).await.unwrap();
        assert_eq!(executed[0].status, MessageStatus::Executed);
        let failed = service.message_instances(&failed_id).await.unwrap();
        assert_eq!(failed[0].status, MessageStatus::Failed);
    }

    #[tokio::test]
    async fn test_underpaid_batch_waits_for_repayment() {
        let service = service();
        let bodies = [deposit(42)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);

        service
            .apply(ObservationEvent::BatchUnderpaid {
                source: SRC,
                dest: DST,
                raw_batch: raw,
                meta: meta(10, 1),
            })
            .await
            .unwrap();

        // Handle observations target no open in-transit instance yet; the
        // payload carrier cannot deliver an unpaid batch, so the instance
        // just sits in Underpaid.
        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Underpaid);
        // Messages were still linked at send time
        let m = service.message_instances(&message_id(&bodies[0])).await.unwrap();
        assert!(m.is_empty() || m[0].is_linked_to(&pid, 0));

        service
            .apply(ObservationEvent::BatchRepaid {
                source: SRC,
                dest: DST,
                payload_id: pid,
                meta: meta(11, 2),
            })
            .await
            .unwrap();
        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads.len(), 1, "repayment must not create an instance");
        assert_eq!(payloads[0].status, PayloadStatus::InTransit);

        // Normal delivery proceeds from here
        for (adapter, kind, tx) in [
            (ADAPTER_A, ParticipationKind::Payload, 3u8),
            (ADAPTER_B, ParticipationKind::Proof, 4),
        ] {
            service
                .apply(ObservationEvent::BatchHandled {
                    source: SRC,
                    dest: DST,
                    payload_id: pid,
                    adapter,
                    kind,
                    meta: meta(20, tx),
                })
                .await
                .unwrap();
        }
        service
            .apply(ObservationEvent::MessageExecuted {
                dest: DST,
                message_id: message_id(&bodies[0]),
                payload_id: pid,
                meta: meta(21, 5),
            })
            .await
            .unwrap();

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Completed);
    }

    #[tokio::test]
    async fn test_disputed_recovery_then_quorum_completes() {
        let service = service();
        let bodies = [deposit(7)];
        let raw = batch(&bodies);
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
        service
            .apply(ObservationEvent::RecoveryDisputed {
                dest: DST,
                adapter: ADAPTER_A,
                payload_hash: content_hash,
                meta: meta(300, 3),
            })
            .await
            .unwrap();
        // Execution after the window is invalid once disputed
        service
            .apply(ObservationEvent::RecoveryExecuted {
                dest: DST,
                adapter: ADAPTER_A,
                payload_hash: content_hash,
                meta: meta(200 + CHALLENGE_PERIOD_SECS, 4),
            })
            .await
            .unwrap();
        let attempt = service
            .recovery_attempt(DST, &ADAPTER_A, &content_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.status, RecoveryStatus::Disputed);
        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::InTransit);
        assert!(!payloads[0].recovered);

        // The normal path still works afterward
        for (adapter, kind, tx) in [
            (ADAPTER_A, ParticipationKind::Payload, 5u8),
            (ADAPTER_C, ParticipationKind::Proof, 6),
        ] {
            service
                .apply(ObservationEvent::BatchHandled {
                    source: SRC,
                    dest: DST,
                    payload_id: pid,
                    adapter,
                    kind,
                    meta: meta(400, tx),
                })
                .await
                .unwrap();
        }
        service
            .apply(ObservationEvent::MessageExecuted {
                dest: DST,
                message_id: message_id(&bodies[0]),
                payload_id: pid,
                meta: meta(401, 7),
            })
            .await
            .unwrap();

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Completed);
        assert_eq!(payloads[0].completed_via, Some(CompletionPath::Quorum));
    }

    #[tokio::test]
    async fn test_undisputed_recovery_force_delivers() {
        let service = service();
        let bodies = [deposit(9), redeem(3)];
        let raw = batch(&bodies);
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
        service
            .apply(ObservationEvent::RecoveryExecuted {
                dest: DST,
                adapter: ADAPTER_A,
                payload_hash: content_hash,
                meta: meta(200 + CHALLENGE_PERIOD_SECS, 3),
            })
            .await
            .unwrap();

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Delivered);
        assert!(payloads[0].recovered);

        // Executions complete the batch via the recovery path; no handle
        // observations ever arrived.
        let mut tx = 4u8;
        for body in &bodies {
            service
                .apply(ObservationEvent::MessageExecuted {
                    dest: DST,
                    message_id: message_id(body),
                    payload_id: pid,
                    meta: meta(200 + CHALLENGE_PERIOD_SECS + 1, tx),
                })
                .await
                .unwrap();
            tx += 1;
        }
        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Completed);
        assert_eq!(payloads[0].completed_via, Some(CompletionPath::Recovery));
    }

    #[tokio::test]
    async fn test_handle_before_send_is_tolerated() {
        // Cross-network watchers race; a handle observation can be processed
        // before the send-side one. It is dropped with a warning, and the
        // later handle replay (at-least-once) lands normally.
        let service = service();
        let bodies = [deposit(1)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);

        service
            .apply(ObservationEvent::BatchHandled {
                source: SRC,
                dest: DST,
                payload_id: pid,
                adapter: ADAPTER_A,
                kind: ParticipationKind::Payload,
                meta: meta(50, 1),
            })
            .await
            .unwrap();
        assert!(service.payload_instances(&pid).await.unwrap().is_empty());

        service
            .apply(ObservationEvent::BatchSent {
                source: SRC,
                dest: DST,
                raw_batch: raw,
                adapter: ADAPTER_A,
                kind: ParticipationKind::Payload,
                meta: meta(40, 2),
            })
            .await
            .unwrap();
        service
            .apply(ObservationEvent::BatchHandled {
                source: SRC,
                dest: DST,
                payload_id: pid,
                adapter: ADAPTER_A,
                kind: ParticipationKind::Payload,
                meta: meta(50, 1),
            })
            .await
            .unwrap();

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Delivered);
    }
}
