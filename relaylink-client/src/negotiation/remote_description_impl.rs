use crate::negotiation::NegotiationController;
use crate::peer::{NegotiationState, PeerRegistry};
use relaylink_core::{PeerId, SdpKind};
use tracing::{debug, warn};

impl NegotiationController {
    /// Apply the remote description, then flush every buffered candidate in
    /// arrival order. A failure here is fatal for the record.
    ///
    /// Returns whether the record is still live and negotiating.
    pub(super) async fn apply_remote_description(
        &self,
        registry: &mut PeerRegistry,
        peer_id: &PeerId,
        generation: u64,
        kind: SdpKind,
        sdp: String,
    ) -> bool {
        let Some(record) = registry.get_current(peer_id, generation) else {
            return false;
        };
        let connection = record.connection.clone();

        if let Err(e) = connection.set_remote_description(kind, sdp).await {
            self.fail_peer(registry, peer_id, generation, e).await;
            return false;
        }

        let Some(record) = registry.get_current(peer_id, generation) else {
            return false;
        };
        record.has_remote_description = true;
        record.state = NegotiationState::Negotiating;
        let pending = record.pending_candidates.take_all();

        if !pending.is_empty() {
            debug!(
                "Flushing {} buffered candidates for {:?}",
                pending.len(),
                peer_id
            );
        }

        let mut rejected = 0;
        for candidate in &pending {
            if let Err(e) = connection.add_candidate(candidate).await {
                warn!("Buffered candidate for {:?} rejected: {}", peer_id, e);
                rejected += 1;
            }
        }

        match registry.get_current(peer_id, generation) {
            Some(record) => {
                record.rejected_candidates += rejected;
                true
            }
            None => false,
        }
    }
}
