use crate::negotiation::NegotiationController;
use crate::peer::{NegotiationState, PeerRegistry};
use relaylink_core::{PeerId, SdpKind};
use tracing::{debug, info, warn};

impl NegotiationController {
    /// Host side: complete the exchange started by [`Self::start_offer`].
    /// Answers for unknown peers, or for records not waiting on one, are
    /// ignored.
    pub(crate) async fn handle_answer(
        &self,
        registry: &mut PeerRegistry,
        from: &PeerId,
        sdp: String,
    ) {
        let Some(record) = registry.get(from) else {
            debug!("Ignoring answer from {:?}: no record", from);
            return;
        };
        if record.state != NegotiationState::AwaitingRemoteDescription {
            warn!(
                "Ignoring answer from {:?} in state {:?}",
                from, record.state
            );
            return;
        }
        let generation = record.generation;

        info!("Received answer from {:?}", from);
        self.apply_remote_description(registry, from, generation, SdpKind::Answer, sdp)
            .await;
    }
}
