use crate::relay::Relay;
use relaylink_core::{PeerId, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Queue of outgoing signals, delivered in order by a background task so
/// the event loop never waits on a relay round-trip.
pub(crate) struct SignalOutbox {
    tx: mpsc::UnboundedSender<(PeerId, SignalPayload)>,
}

impl SignalOutbox {
    /// Spawn the delivery task. It exits once the outbox is dropped and the
    /// queue is drained.
    pub(crate) fn spawn(relay: Arc<dyn Relay>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(PeerId, SignalPayload)>();

        tokio::spawn(async move {
            while let Some((to, payload)) = rx.recv().await {
                let kind = payload.kind();
                if let Err(e) = relay.signal(&to, payload).await {
                    warn!("Failed to relay {} to {:?}: {}", kind, to, e);
                }
            }
            debug!("Signal outbox closed");
        });

        Self { tx }
    }

    /// Nothing retries a lost signal; the connection state will show the
    /// outcome.
    pub(crate) fn send(&self, to: &PeerId, payload: SignalPayload) {
        let kind = payload.kind();
        if self.tx.send((to.clone(), payload)).is_err() {
            warn!("Signal outbox gone, dropping {} to {:?}", kind, to);
        }
    }
}
