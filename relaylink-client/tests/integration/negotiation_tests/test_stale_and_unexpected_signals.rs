use relaylink_client::ClientEvent;
use relaylink_client::transport::TransportEvent;
use relaylink_core::{ChannelMessage, ConnectionState, PeerId};
use serde_json::json;

use crate::integration::{create_guest, create_host, test_config};
use crate::utils::{EVENT_TIMEOUT_MS, wait_for_event};

#[tokio::test]
async fn test_events_from_replaced_connection_are_ignored() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");

    harness.client.approve_peer(&g1, true).await.unwrap();
    let old_sink = harness.transport.sink(&g1);
    harness.client.approve_peer(&g1, true).await.unwrap();

    old_sink.emit(TransportEvent::StateChanged(ConnectionState::Connected));
    harness.transport.open_channel(&g1, "data");
    harness.transport.deliver(&g1, "marker");

    let mut seen = Vec::new();
    loop {
        let event = wait_for_event(&mut harness.events, EVENT_TIMEOUT_MS, |_| true)
            .await
            .unwrap();
        if matches!(&event, ClientEvent::DataChannelMessage { message, .. }
            if *message == ChannelMessage::from("marker"))
        {
            break;
        }
        seen.push(event);
    }
    assert!(
        !seen
            .iter()
            .any(|e| matches!(e, ClientEvent::PeerConnected { .. }))
    );
}

#[tokio::test]
async fn test_answer_without_record_is_ignored() {
    let mut harness = create_guest(test_config()).await.unwrap();
    let stranger = PeerId::from("stranger");

    harness.push_answer(&stranger, "answer");
    harness.sync_relay().await.unwrap();

    assert!(harness.client.peers().await.is_empty());
    assert!(harness.transport.ops().is_empty());
}

#[tokio::test]
async fn test_duplicate_answer_is_ignored() {
    let mut harness = create_host(test_config()).await.unwrap();
    let g1 = PeerId::from("g1");
    harness.client.approve_peer(&g1, true).await.unwrap();

    harness.push_answer(&g1, "first");
    harness.push_answer(&g1, "second");
    harness.sync_relay().await.unwrap();

    let set_remote = harness
        .transport
        .ops_for(&g1)
        .into_iter()
        .filter(|op| matches!(op, crate::utils::TransportOp::SetRemote { .. }))
        .count();
    assert_eq!(set_remote, 1);
    assert!(harness.snapshot(&g1).await.is_some());
}

#[tokio::test]
async fn test_malformed_signal_is_dropped() {
    let mut harness = create_guest(test_config()).await.unwrap();
    let host = PeerId::from("host");

    harness
        .relay
        .push_signal(&host, json!({ "type": "renegotiate", "sdp": "x" }));
    harness.relay.push_signal(&host, json!("not an object"));
    harness.sync_relay().await.unwrap();

    assert!(harness.client.peers().await.is_empty());
    assert!(harness.transport.ops().is_empty());

    // The client keeps working afterwards.
    harness.push_offer(&host, "offer");
    harness
        .wait_for_peers(|peers| peers.iter().any(|p| p.has_remote_description))
        .await
        .unwrap();
}
