use crate::transport::DataChannel;
use relaylink_core::{Candidate, ChannelMessage, ConnectionState, PeerId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events a direct connection generates for the negotiation logic.
pub enum TransportEvent {
    /// A local candidate was found; it goes to the remote side right away.
    CandidateDiscovered(Candidate),

    StateChanged(ConnectionState),

    /// The remote side opened a data channel (answerer only).
    ChannelReceived(Arc<dyn DataChannel>),

    ChannelOpen,

    ChannelMessage(ChannelMessage),

    ChannelClosed,
}

impl fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CandidateDiscovered(c) => f.debug_tuple("CandidateDiscovered").field(c).finish(),
            Self::StateChanged(s) => f.debug_tuple("StateChanged").field(s).finish(),
            Self::ChannelReceived(dc) => f.debug_tuple("ChannelReceived").field(&dc.label()).finish(),
            Self::ChannelOpen => f.write_str("ChannelOpen"),
            Self::ChannelMessage(m) => f.debug_tuple("ChannelMessage").field(&m.len()).finish(),
            Self::ChannelClosed => f.write_str("ChannelClosed"),
        }
    }
}

/// A [`TransportEvent`] stamped with the record it belongs to.
#[derive(Debug)]
pub struct PeerEvent {
    pub peer_id: PeerId,
    pub generation: u64,
    pub event: TransportEvent,
}

/// Where a connection delivers its events. The generation tells a live
/// record apart from an earlier one for the same peer.
#[derive(Clone)]
pub struct TransportSink {
    peer_id: PeerId,
    generation: u64,
    tx: mpsc::UnboundedSender<PeerEvent>,
}

impl TransportSink {
    pub fn new(peer_id: PeerId, generation: u64, tx: mpsc::UnboundedSender<PeerEvent>) -> Self {
        Self {
            peer_id,
            generation,
            tx,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, event: TransportEvent) {
        let _ = self.tx.send(PeerEvent {
            peer_id: self.peer_id.clone(),
            generation: self.generation,
            event,
        });
    }
}
