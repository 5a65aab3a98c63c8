use crate::event::ClientEvent;
use crate::negotiation::NegotiationController;
use crate::peer::{NegotiationState, PeerRegistry};
use crate::transport::{PeerEvent, TransportEvent};
use relaylink_core::{ConnectionState, SignalPayload};
use tracing::{debug, info};

impl NegotiationController {
    /// Route an event from a direct connection. Events from a record that
    /// has since been removed or replaced are dropped.
    pub(crate) async fn handle_transport_event(
        &self,
        registry: &mut PeerRegistry,
        peer_event: PeerEvent,
    ) {
        let PeerEvent {
            peer_id,
            generation,
            event,
        } = peer_event;

        let Some(record) = registry.get_current(&peer_id, generation) else {
            debug!("Dropping stale {:?} for {:?}", event, peer_id);
            return;
        };

        match event {
            TransportEvent::CandidateDiscovered(candidate) => {
                self.send_signal(&peer_id, SignalPayload::Candidate { candidate });
            }
            TransportEvent::StateChanged(state) => {
                info!("Connection to {:?} is {}", peer_id, state);
                self.events.emit(ClientEvent::PeerConnectionState {
                    peer_id: peer_id.clone(),
                    state,
                });

                match state {
                    ConnectionState::Connected => {
                        record.state = NegotiationState::Connected;
                        self.events.emit(ClientEvent::PeerConnected {
                            peer_id: peer_id.clone(),
                        });
                    }
                    ConnectionState::Failed => {
                        registry.remove(&peer_id).await;
                    }
                    _ => {}
                }
            }
            TransportEvent::ChannelReceived(channel) => {
                debug!("Data channel '{}' received from {:?}", channel.label(), peer_id);
                record.channel = Some(channel);
                record.channel_open = false;
            }
            TransportEvent::ChannelOpen => {
                record.channel_open = true;
                let label = record
                    .channel
                    .as_ref()
                    .map(|channel| channel.label())
                    .unwrap_or_else(|| self.channel_label.clone());
                info!("Data channel '{}' open with {:?}", label, peer_id);
                self.events
                    .emit(ClientEvent::DataChannelOpen { peer_id, label });
            }
            TransportEvent::ChannelMessage(message) => {
                self.events
                    .emit(ClientEvent::DataChannelMessage { peer_id, message });
            }
            TransportEvent::ChannelClosed => {
                record.channel_open = false;
                info!("Data channel with {:?} closed", peer_id);
                self.events.emit(ClientEvent::DataChannelClose { peer_id });
            }
        }
    }
}
