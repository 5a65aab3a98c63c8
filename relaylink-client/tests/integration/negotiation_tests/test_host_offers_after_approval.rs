use relaylink_client::{ClientEvent, NegotiationRole, NegotiationState};
use relaylink_core::{ConnectionState, PeerId, SdpKind, SignalPayload};

use crate::integration::{create_host, is_signal, test_config};
use crate::utils::{
    EVENT_TIMEOUT_MS, RelayCall, TransportOp, wait_for_call, wait_for_event, wait_until,
};

#[tokio::test]
async fn test_host_offers_after_approval() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");

    let reply = harness.client.approve_peer(&g1, true).await.unwrap();
    assert!(reply.success);

    assert_eq!(
        harness.transport.ops_for(&g1),
        vec![
            TransportOp::Create {
                peer_id: g1.clone(),
                generation: 1,
            },
            TransportOp::CreateChannel {
                peer_id: g1.clone(),
                label: "data".to_string(),
            },
            TransportOp::CreateOffer { peer_id: g1.clone() },
        ]
    );
    let call = wait_for_call(&mut harness.calls, EVENT_TIMEOUT_MS, |c| {
        is_signal(c, &g1, "offer")
    })
    .await
    .unwrap();
    assert_eq!(
        call,
        RelayCall::Signal {
            to: g1.clone(),
            payload: SignalPayload::Offer {
                sdp: "offer-for-g1".to_string()
            },
        }
    );

    let snapshot = harness.snapshot(&g1).await.unwrap();
    assert_eq!(snapshot.role, NegotiationRole::Offerer);
    assert_eq!(snapshot.state, NegotiationState::AwaitingRemoteDescription);
    assert!(!snapshot.has_remote_description);

    harness.push_answer(&g1, "answer-from-g1");
    harness
        .wait_for_peers(|peers| peers.iter().any(|p| p.has_remote_description))
        .await
        .unwrap();

    assert!(harness.transport.ops_for(&g1).contains(&TransportOp::SetRemote {
        peer_id: g1.clone(),
        kind: SdpKind::Answer,
        sdp: "answer-from-g1".to_string(),
    }));
    assert_eq!(
        harness.snapshot(&g1).await.unwrap().state,
        NegotiationState::Negotiating
    );

    harness.transport.set_state(&g1, ConnectionState::Connected);

    let state = wait_for_event(&mut harness.events, EVENT_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::PeerConnectionState { .. })
    })
    .await
    .unwrap();
    assert_eq!(
        state,
        ClientEvent::PeerConnectionState {
            peer_id: g1.clone(),
            state: ConnectionState::Connected,
        }
    );
    wait_for_event(&mut harness.events, EVENT_TIMEOUT_MS, |e| {
        *e == ClientEvent::PeerConnected { peer_id: g1.clone() }
    })
    .await
    .unwrap();
    assert_eq!(
        harness.snapshot(&g1).await.unwrap().state,
        NegotiationState::Connected
    );
}

#[tokio::test]
async fn test_local_candidates_are_signaled() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");
    harness.client.approve_peer(&g1, true).await.unwrap();

    let local = crate::integration::candidate("candidate:1 1 udp 1 10.0.0.1 5000 typ host");
    harness.transport.discover_candidate(&g1, local.clone());

    let call = wait_for_call(&mut harness.calls, EVENT_TIMEOUT_MS, |c| {
        is_signal(c, &g1, "candidate")
    })
    .await
    .unwrap();
    assert_eq!(
        call,
        RelayCall::Signal {
            to: g1,
            payload: SignalPayload::Candidate { candidate: local },
        }
    );
}

#[tokio::test]
async fn test_reapproval_replaces_record() {
    let harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");

    harness.client.approve_peer(&g1, true).await.unwrap();
    harness.client.approve_peer(&g1, true).await.unwrap();

    let ops = harness.transport.ops_for(&g1);
    assert_eq!(harness.transport.created_count(&g1), 2);
    let close_at = ops
        .iter()
        .position(|op| matches!(op, TransportOp::Close { .. }))
        .expect("first connection not closed");
    let second_create = ops
        .iter()
        .rposition(|op| matches!(op, TransportOp::Create { .. }))
        .unwrap();
    assert!(close_at < second_create);

    let peers = harness.client.peers().await;
    assert_eq!(peers.len(), 1);
    let relay = harness.relay.clone();
    wait_until(EVENT_TIMEOUT_MS, || relay.signals_to(&g1).len() == 2)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unsuccessful_approval_does_not_offer() {
    let harness = create_host(test_config()).await.unwrap();
    harness.relay.script(|s| s.approve_success = false);
    let g1 = PeerId::from("g1");

    let reply = harness.client.approve_peer(&g1, true).await.unwrap();

    assert!(!reply.success);
    assert!(harness.client.peers().await.is_empty());
    assert_eq!(harness.transport.created_count(&g1), 0);
}
