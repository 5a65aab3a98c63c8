use relaylink_client::{ClientError, ClientEvent, RelayInbound};
use relaylink_core::PeerId;

use crate::integration::{create_host, test_config};
use crate::utils::{EVENT_TIMEOUT_MS, RelayCall, TransportOp, wait_for_event};

#[tokio::test]
async fn test_disconnect_closes_everything() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");
    let g2 = PeerId::from("g2");
    harness.client.approve_peer(&g1, true).await.unwrap();
    harness.client.approve_peer(&g2, true).await.unwrap();
    assert_eq!(harness.client.peers().await.len(), 2);

    harness.client.disconnect().await;

    wait_for_event(&mut harness.events, EVENT_TIMEOUT_MS, |e| {
        *e == ClientEvent::Disconnected
    })
    .await
    .unwrap();
    assert!(harness.relay.calls().contains(&RelayCall::Close));
    for peer in [&g1, &g2] {
        assert!(
            harness
                .transport
                .ops_for(peer)
                .contains(&TransportOp::Close {
                    peer_id: peer.clone()
                })
        );
    }

    // The event loop is gone.
    assert!(harness.client.peers().await.is_empty());
    assert!(matches!(
        harness.client.create_room().await,
        Err(ClientError::Closed)
    ));
}

#[tokio::test]
async fn test_relay_loss_clears_session_and_peers() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");
    harness.client.approve_peer(&g1, true).await.unwrap();

    harness.relay.push_inbound(RelayInbound::Disconnected);

    wait_for_event(&mut harness.events, EVENT_TIMEOUT_MS, |e| {
        *e == ClientEvent::Disconnected
    })
    .await
    .unwrap();
    assert!(harness.client.session().await.is_none());
    assert!(harness.client.peers().await.is_empty());
    assert!(
        harness
            .transport
            .ops_for(&g1)
            .contains(&TransportOp::Close { peer_id: g1.clone() })
    );
}

#[tokio::test]
async fn test_relay_connected_is_reported() {
    let mut harness = crate::integration::create_test_client(test_config());

    harness.relay.push_inbound(RelayInbound::Connected);

    wait_for_event(&mut harness.events, EVENT_TIMEOUT_MS, |e| {
        *e == ClientEvent::Connected
    })
    .await
    .unwrap();
}
