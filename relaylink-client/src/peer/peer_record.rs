use crate::peer::CandidateBuffer;
use crate::transport::{DataChannel, PeerConnection};
use relaylink_core::PeerId;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Created,
    AwaitingRemoteDescription,
    Negotiating,
    Connected,
    Closed,
}

/// Per-peer negotiation state. Owned by [`crate::peer::PeerRegistry`].
pub struct PeerRecord {
    pub(crate) peer_id: PeerId,
    pub(crate) generation: u64,
    pub(crate) role: NegotiationRole,
    pub(crate) connection: Arc<dyn PeerConnection>,
    pub(crate) channel: Option<Arc<dyn DataChannel>>,
    pub(crate) channel_open: bool,
    pub(crate) pending_candidates: CandidateBuffer,
    pub(crate) has_remote_description: bool,
    pub(crate) state: NegotiationState,
    pub(crate) rejected_candidates: usize,
}

/// Read-only view of a [`PeerRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    pub peer_id: PeerId,
    pub role: NegotiationRole,
    pub state: NegotiationState,
    pub has_remote_description: bool,
    pub pending_candidates: usize,
    pub channel_open: bool,
    pub rejected_candidates: usize,
}

impl PeerRecord {
    pub(crate) fn new(
        peer_id: PeerId,
        generation: u64,
        role: NegotiationRole,
        connection: Arc<dyn PeerConnection>,
    ) -> Self {
        Self {
            peer_id,
            generation,
            role,
            connection,
            channel: None,
            channel_open: false,
            pending_candidates: CandidateBuffer::new(),
            has_remote_description: false,
            state: NegotiationState::Created,
            rejected_candidates: 0,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn has_remote_description(&self) -> bool {
        self.has_remote_description
    }

    /// The channel, if it exists and is open.
    pub fn open_channel(&self) -> Option<Arc<dyn DataChannel>> {
        self.channel
            .as_ref()
            .filter(|channel| self.channel_open && channel.is_open())
            .cloned()
    }

    pub fn snapshot(&self) -> PeerSnapshot {
        PeerSnapshot {
            peer_id: self.peer_id.clone(),
            role: self.role,
            state: self.state,
            has_remote_description: self.has_remote_description,
            pending_candidates: self.pending_candidates.len(),
            channel_open: self.channel_open,
            rejected_candidates: self.rejected_candidates,
        }
    }
}
