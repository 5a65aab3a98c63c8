use relaylink_client::{ClientEvent, NegotiationState};
use relaylink_core::{ChannelMessage, PeerId};

use crate::integration::{candidate, create_guest, create_host, test_config};
use crate::utils::{EVENT_TIMEOUT_MS, wait_for_event};

#[tokio::test]
async fn test_two_clients_negotiate_through_linked_relays() {
    let mut host = create_host(test_config()).await.unwrap();
    let mut guest = create_guest(test_config()).await.unwrap();
    let host_id = PeerId::from("host");
    let guest_id = PeerId::from("guest");
    host.relay.link_to(host_id.clone(), &guest.relay);
    guest.relay.link_to(guest_id.clone(), &host.relay);

    host.client.approve_peer(&guest_id, true).await.unwrap();

    host.wait_for_peers(|peers| peers.iter().any(|p| p.has_remote_description))
        .await
        .unwrap();
    let guest_view = guest.snapshot(&host_id).await.unwrap();
    assert_eq!(guest_view.state, NegotiationState::Negotiating);

    let c = candidate("candidate:7 1 udp 7 192.168.1.2 6000 typ host");
    host.transport.discover_candidate(&guest_id, c.clone());
    crate::utils::wait_until(EVENT_TIMEOUT_MS, || {
        guest.transport.applied_candidates(&host_id) == vec![c.clone()]
    })
    .await
    .unwrap();

    host.transport.open_channel(&guest_id, "data");
    guest.transport.open_channel(&host_id, "data");
    wait_for_event(&mut host.events, EVENT_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::DataChannelOpen { .. })
    })
    .await
    .unwrap();
    wait_for_event(&mut guest.events, EVENT_TIMEOUT_MS, |e| {
        matches!(e, ClientEvent::DataChannelOpen { .. })
    })
    .await
    .unwrap();

    assert!(host.client.send(&guest_id, "hi guest").await);
    assert!(guest.client.send(&host_id, vec![1u8, 2, 3]).await);
    assert_eq!(
        host.transport.sent_to(&guest_id),
        vec![ChannelMessage::from("hi guest")]
    );
    assert_eq!(
        guest.transport.sent_to(&host_id),
        vec![ChannelMessage::from(vec![1u8, 2, 3])]
    );
}
