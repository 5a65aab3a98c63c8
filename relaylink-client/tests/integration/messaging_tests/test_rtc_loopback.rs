use relaylink_client::{Client, ClientEvent, RtcTransport};
use relaylink_core::{ChannelMessage, PeerId};
use std::sync::Arc;

use crate::integration::test_config;
use crate::utils::{CONNECTION_TIMEOUT_MS, MockRelay, init_tracing, wait_for_event};

/// Two clients on real WebRTC connections, with signaling carried by a pair
/// of linked in-process relays. Only host candidates are used.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rtc_peers_exchange_messages() {
    init_tracing();

    let host_id = PeerId::from("host");
    let guest_id = PeerId::from("guest");

    let (host_relay, host_inbound, _host_calls) = MockRelay::new();
    let (guest_relay, guest_inbound, _guest_calls) = MockRelay::new();
    host_relay.link_to(host_id.clone(), &guest_relay);
    guest_relay.link_to(guest_id.clone(), &host_relay);

    let (host, mut host_events) = Client::start(
        test_config(),
        Arc::new(host_relay),
        host_inbound,
        Arc::new(RtcTransport::new().expect("webrtc api")),
    );
    let (guest, mut guest_events) = Client::start(
        test_config(),
        Arc::new(guest_relay),
        guest_inbound,
        Arc::new(RtcTransport::new().expect("webrtc api")),
    );

    host.create_room().await.unwrap();
    guest.join_room("ABCD", Some("Guest")).await.unwrap();
    host.approve_peer(&guest_id, true).await.unwrap();

    wait_for_event(&mut host_events, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::DataChannelOpen { .. })
    })
    .await
    .expect("host channel never opened");
    wait_for_event(&mut guest_events, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::DataChannelOpen { .. })
    })
    .await
    .expect("guest channel never opened");

    assert!(host.send(&guest_id, "hello guest").await);
    let received = wait_for_event(&mut guest_events, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::DataChannelMessage { .. })
    })
    .await
    .unwrap();
    assert_eq!(
        received,
        ClientEvent::DataChannelMessage {
            peer_id: host_id.clone(),
            message: ChannelMessage::from("hello guest"),
        }
    );

    assert!(guest.send(&host_id, vec![1u8, 2, 3]).await);
    let received = wait_for_event(&mut host_events, CONNECTION_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::DataChannelMessage { .. })
    })
    .await
    .unwrap();
    assert_eq!(
        received,
        ClientEvent::DataChannelMessage {
            peer_id: guest_id.clone(),
            message: ChannelMessage::from(vec![1u8, 2, 3]),
        }
    );

    host.disconnect().await;
    guest.disconnect().await;
}
