use crate::event::ClientEvent;
use crate::negotiation::NegotiationController;
use crate::peer::{NegotiationRole, PeerRegistry};
use relaylink_core::{ConnectionState, IceServerConfig, PeerId, SdpKind, SignalPayload};
use tracing::{error, info, warn};

impl NegotiationController {
    /// Guest side: answer an inbound offer, creating the answerer record on
    /// first contact.
    pub(crate) async fn handle_offer(
        &self,
        registry: &mut PeerRegistry,
        from: &PeerId,
        sdp: String,
        ice_servers: &[IceServerConfig],
    ) {
        let generation = match registry.get(from) {
            Some(record) if record.role == NegotiationRole::Offerer => {
                warn!("Ignoring offer from {:?}: we are the offering side", from);
                return;
            }
            Some(record) => record.generation,
            None => match registry
                .create(from, NegotiationRole::Answerer, ice_servers)
                .await
            {
                Ok(record) => record.generation,
                Err(e) => {
                    error!("Could not create record for {:?}: {}", from, e);
                    self.events.emit(ClientEvent::PeerConnectionState {
                        peer_id: from.clone(),
                        state: ConnectionState::Failed,
                    });
                    return;
                }
            },
        };

        info!("Received offer from {:?}", from);
        if !self
            .apply_remote_description(registry, from, generation, SdpKind::Offer, sdp)
            .await
        {
            return;
        }

        let Some(record) = registry.get_current(from, generation) else {
            return;
        };
        let connection = record.connection.clone();

        match connection.create_answer().await {
            Ok(sdp) => {
                if registry.get_current(from, generation).is_none() {
                    return;
                }
                info!("Sending answer to {:?}", from);
                self.send_signal(from, SignalPayload::Answer { sdp });
            }
            Err(e) => self.fail_peer(registry, from, generation, e).await,
        }
    }
}
