//! Content-identical concurrent transfers.
//!
//! Identity hashes are derived from content only, so two in-flight transfers
//! of the same bytes between the same networks share one id. Positional
//! FIFO matching must keep their lifecycles separate.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cm_lifecycle::ports::inbound::LifecycleApi;
    use cm_lifecycle::{MessageStatus, ObservationEvent, ParticipationKind, PayloadStatus};

    #[tokio::test]
    async fn test_identical_sends_get_sequential_positions() {
        let service = service();
        let raw = batch(&[deposit(500)]);
        let pid = payload_id(&raw);

        for tx in 1..=3u8 {
            service
                .apply(ObservationEvent::BatchSent {
                    source: SRC,
                    dest: DST,
                    raw_batch: raw.clone(),
                    adapter: ADAPTER_A,
                    kind: ParticipationKind::Payload,
                    meta: meta(tx as u64, tx),
                })
                .await
                .unwrap();
        }

        let payloads = service.payload_instances(&pid).await.unwrap();
        let positions: Vec<u64> = payloads.iter().map(|p| p.position_index).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_colliding_lifecycles_progress_independently() {
        let service = service();
        let bodies = [deposit(500)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);
        let mid = message_id(&bodies[0]);

        // Two identical transfers in flight
        for tx in 1..=2u8 {
            service
                .apply(ObservationEvent::MessagePrepared {
                    source: SRC,
                    dest: DST,
                    raw_message: bodies[0].encode(),
                    meta: meta(tx as u64, tx),
                })
                .await
                .unwrap();
            service
                .apply(ObservationEvent::BatchSent {
                    source: SRC,
                    dest: DST,
                    raw_batch: raw.clone(),
                    adapter: ADAPTER_A,
                    kind: ParticipationKind::Payload,
                    meta: meta(10 + tx as u64, 10 + tx),
                })
                .await
                .unwrap();
        }

        let messages = service.message_instances(&mid).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_linked_to(&pid, 0));
        assert!(messages[1].is_linked_to(&pid, 1));

        // One delivery + quorum + execution: only instance 0 completes
        for (adapter, kind, tx) in [
            (ADAPTER_A, ParticipationKind::Payload, 20u8),
            (ADAPTER_B, ParticipationKind::Proof, 21),
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
                message_id: mid,
                payload_id: pid,
                meta: meta(21, 22),
            })
            .await
            .unwrap();

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads[0].status, PayloadStatus::Completed);
        assert_eq!(payloads[1].status, PayloadStatus::InTransit);

        let messages = service.message_instances(&mid).await.unwrap();
        assert_eq!(messages[0].status, MessageStatus::Executed);
        assert_eq!(messages[1].status, MessageStatus::AwaitingBatchDelivery);

        // Handle-side votes stayed on instance 0; instance 1 only has its
        // own send-side row
        assert_eq!(service.participation_for(&pid, 0).await.unwrap().len(), 3);
        assert_eq!(service.participation_for(&pid, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_instance_completes_after_first() {
        let service = service();
        let bodies = [deposit(500)];
        let raw = batch(&bodies);
        let pid = payload_id(&raw);
        let mid = message_id(&bodies[0]);

        // Full lifecycle twice, sequentially, same content
        apply_log(&service, &happy_log(&bodies, 100, 1)).await;
        apply_log(&service, &happy_log(&bodies, 200, 101)).await;

        let payloads = service.payload_instances(&pid).await.unwrap();
        assert_eq!(payloads.len(), 2);
        assert!(payloads.iter().all(|p| p.status == PayloadStatus::Completed));

        let messages = service.message_instances(&mid).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.status == MessageStatus::Executed));
        assert!(messages[1].is_linked_to(&pid, 1));
    }
}
