use crate::error::ClientError;
use crate::negotiation::NegotiationController;
use crate::peer::{NegotiationRole, NegotiationState, PeerRegistry};
use relaylink_core::{IceServerConfig, PeerId, SignalPayload};
use tracing::info;

impl NegotiationController {
    /// Host side: create an offerer record with a data channel, then send
    /// the offer. A record that already exists for `peer_id` is replaced.
    ///
    /// Errors only when the record itself could not be created. A failed
    /// negotiation step tears the record down and is reported as
    /// `peer:connectionstate` failed.
    pub(crate) async fn start_offer(
        &self,
        registry: &mut PeerRegistry,
        peer_id: &PeerId,
        ice_servers: &[IceServerConfig],
    ) -> Result<(), ClientError> {
        if registry.remove(peer_id).await {
            info!("Replacing existing record for {:?}", peer_id);
        }

        let record = registry
            .create(peer_id, NegotiationRole::Offerer, ice_servers)
            .await?;
        let generation = record.generation;
        let connection = record.connection.clone();

        let channel = match connection.create_channel(&self.channel_label).await {
            Ok(channel) => channel,
            Err(e) => {
                self.fail_peer(registry, peer_id, generation, e).await;
                return Ok(());
            }
        };
        match registry.get_current(peer_id, generation) {
            Some(record) => record.channel = Some(channel),
            None => return Ok(()),
        }

        let sdp = match connection.create_offer().await {
            Ok(sdp) => sdp,
            Err(e) => {
                self.fail_peer(registry, peer_id, generation, e).await;
                return Ok(());
            }
        };
        let Some(record) = registry.get_current(peer_id, generation) else {
            return Ok(());
        };
        record.state = NegotiationState::AwaitingRemoteDescription;

        info!("Sending offer to {:?}", peer_id);
        self.send_signal(peer_id, SignalPayload::Offer { sdp });
        Ok(())
    }
}
