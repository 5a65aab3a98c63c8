use relaylink_core::PeerId;

use crate::integration::{candidate, create_host, test_config};
use crate::utils::{EVENT_TIMEOUT_MS, TransportOp, wait_until};

#[tokio::test]
async fn test_candidates_wait_for_remote_description() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");
    harness.client.approve_peer(&g1, true).await.unwrap();

    let c1 = candidate("c1");
    let c2 = candidate("c2");
    harness.push_candidate(&g1, &c1);
    harness.push_candidate(&g1, &c2);
    harness.sync_relay().await.unwrap();

    assert!(harness.transport.applied_candidates(&g1).is_empty());
    let snapshot = harness.snapshot(&g1).await.unwrap();
    assert_eq!(snapshot.pending_candidates, 2);
    assert!(!snapshot.has_remote_description);

    harness.push_answer(&g1, "answer");
    harness
        .wait_for_peers(|peers| peers.iter().any(|p| p.has_remote_description))
        .await
        .unwrap();

    let ops = harness.transport.ops_for(&g1);
    let set_remote = ops
        .iter()
        .position(|op| matches!(op, TransportOp::SetRemote { .. }))
        .unwrap();
    let first_candidate = ops
        .iter()
        .position(|op| matches!(op, TransportOp::AddCandidate { .. }))
        .unwrap();
    assert!(set_remote < first_candidate);
    assert_eq!(
        harness.transport.applied_candidates(&g1),
        vec![c1.clone(), c2.clone()]
    );
    assert_eq!(harness.snapshot(&g1).await.unwrap().pending_candidates, 0);

    // Once the description is in, candidates apply immediately.
    let c3 = candidate("c3");
    harness.push_candidate(&g1, &c3);
    let transport = harness.transport.clone();
    wait_until(EVENT_TIMEOUT_MS, || {
        transport.applied_candidates(&g1) == vec![c1.clone(), c2.clone(), c3.clone()]
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_rejected_candidate_is_counted_and_isolated() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");
    let g2 = PeerId::from("g2");
    harness.client.approve_peer(&g1, true).await.unwrap();
    harness.client.approve_peer(&g2, true).await.unwrap();
    harness.push_answer(&g1, "answer-1");
    harness.push_answer(&g2, "answer-2");
    harness
        .wait_for_peers(|peers| peers.iter().all(|p| p.has_remote_description))
        .await
        .unwrap();

    harness
        .transport
        .fail(|f| f.rejected_candidates.push("stale".to_string()));
    harness.push_candidate(&g1, &candidate("stale"));
    harness.push_candidate(&g2, &candidate("fine"));
    harness.sync_relay().await.unwrap();

    let g1_view = harness.snapshot(&g1).await.unwrap();
    let g2_view = harness.snapshot(&g2).await.unwrap();
    assert_eq!(g1_view.rejected_candidates, 1);
    assert_eq!(g2_view.rejected_candidates, 0);
    assert_eq!(g1_view.state, g2_view.state);
    assert_eq!(
        harness.transport.applied_candidates(&g2),
        vec![candidate("fine")]
    );
}
