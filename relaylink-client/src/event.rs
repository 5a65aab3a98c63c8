use relaylink_core::{ChannelMessage, ConnectionState, PeerId};
use tokio::sync::mpsc;
use tracing::trace;

/// Notifications emitted by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    PeerRequest {
        peer_id: PeerId,
        name: Option<String>,
    },
    PeerApproved {
        host_id: Option<PeerId>,
    },
    PeerDenied,
    PeerDisconnected {
        peer_id: PeerId,
    },
    HostDisconnected,
    HostReconnected {
        host_id: Option<PeerId>,
    },
    PeerConnectionState {
        peer_id: PeerId,
        state: ConnectionState,
    },
    PeerConnected {
        peer_id: PeerId,
    },
    DataChannelOpen {
        peer_id: PeerId,
        label: String,
    },
    DataChannelClose {
        peer_id: PeerId,
    },
    DataChannelMessage {
        peer_id: PeerId,
        message: ChannelMessage,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::PeerRequest { .. } => "peer:request",
            Self::PeerApproved { .. } => "peer:approved",
            Self::PeerDenied => "peer:denied",
            Self::PeerDisconnected { .. } => "peer:disconnected",
            Self::HostDisconnected => "host:disconnected",
            Self::HostReconnected { .. } => "host:reconnected",
            Self::PeerConnectionState { .. } => "peer:connectionstate",
            Self::PeerConnected { .. } => "peer:connected",
            Self::DataChannelOpen { .. } => "datachannel:open",
            Self::DataChannelClose { .. } => "datachannel:close",
            Self::DataChannelMessage { .. } => "datachannel:message",
        }
    }
}

#[derive(Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        trace!("emit {}", event.name());
        // Nobody listening is not an error.
        let _ = self.tx.send(event);
    }
}
