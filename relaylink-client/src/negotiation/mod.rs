mod handle_answer_impl;
mod handle_candidate_impl;
mod handle_offer_impl;
mod remote_description_impl;
mod signal_outbox;
mod start_offer_impl;
mod transport_event_impl;

use crate::event::{ClientEvent, EventSink};
use crate::peer::PeerRegistry;
use crate::relay::Relay;
use relaylink_core::{ConnectionState, PeerId, SignalPayload};
use signal_outbox::SignalOutbox;
use std::fmt::Display;
use std::sync::Arc;
use tracing::error;

/// Drives offer/answer/candidate exchange for every peer in a
/// [`PeerRegistry`].
///
/// Methods take the registry by `&mut`, so one controller call runs at a
/// time. Across an `await` a record may be removed and recreated, which is
/// why every continuation re-resolves it by generation.
pub(crate) struct NegotiationController {
    outbox: SignalOutbox,
    events: EventSink,
    channel_label: String,
}

impl NegotiationController {
    pub(crate) fn new(relay: Arc<dyn Relay>, events: EventSink, channel_label: String) -> Self {
        Self {
            outbox: SignalOutbox::spawn(relay),
            events,
            channel_label,
        }
    }

    pub(crate) fn channel_label(&self) -> &str {
        &self.channel_label
    }

    /// Queue a signal for the relay. Returns without waiting for delivery.
    fn send_signal(&self, to: &PeerId, payload: SignalPayload) {
        self.outbox.send(to, payload);
    }

    /// Tear down a record whose negotiation cannot continue and report it
    /// as failed. Does nothing if `generation` is no longer current.
    async fn fail_peer(
        &self,
        registry: &mut PeerRegistry,
        peer_id: &PeerId,
        generation: u64,
        reason: impl Display,
    ) {
        if registry.get_current(peer_id, generation).is_none() {
            return;
        }
        error!("Negotiation with {:?} failed: {}", peer_id, reason);
        registry.remove(peer_id).await;
        self.events.emit(ClientEvent::PeerConnectionState {
            peer_id: peer_id.clone(),
            state: ConnectionState::Failed,
        });
    }
}
