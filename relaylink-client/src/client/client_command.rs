use crate::error::ClientError;
use crate::peer::PeerSnapshot;
use crate::session::{PeerRequest, RoomSession};
use relaylink_core::{ApprovePeerReply, ChannelMessage, CreateRoomReply, JoinRoomReply, PeerId};
use tokio::sync::oneshot;

/// Requests from a [`crate::Client`] handle to its event loop.
#[derive(Debug)]
pub enum ClientCommand {
    CreateRoom {
        reply: oneshot::Sender<Result<CreateRoomReply, ClientError>>,
    },
    JoinRoom {
        code: String,
        name: Option<String>,
        reply: oneshot::Sender<Result<JoinRoomReply, ClientError>>,
    },
    /// Host decision on a guest's request.
    ApprovePeer {
        peer_id: PeerId,
        approved: bool,
        reply: oneshot::Sender<Result<ApprovePeerReply, ClientError>>,
    },
    Send {
        peer_id: PeerId,
        message: ChannelMessage,
        reply: oneshot::Sender<bool>,
    },
    /// Replies with the number of peers the message went to.
    Broadcast {
        message: ChannelMessage,
        reply: oneshot::Sender<usize>,
    },
    RemovePeer {
        peer_id: PeerId,
        reply: oneshot::Sender<bool>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Session {
        reply: oneshot::Sender<Option<RoomSession>>,
    },
    Peers {
        reply: oneshot::Sender<Vec<PeerSnapshot>>,
    },
    EarlyCandidates {
        peer_id: PeerId,
        reply: oneshot::Sender<usize>,
    },
    PendingRequests {
        reply: oneshot::Sender<Vec<PeerRequest>>,
    },
}
