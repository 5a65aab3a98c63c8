mod ws_relay;

use crate::error::RelayError;
use async_trait::async_trait;
use relaylink_core::{
    ApprovePeerReply, CreateRoomReply, JoinRoomReply, PeerId, RelayEvent, SignalPayload,
};

pub use ws_relay::WsRelay;

/// Traffic pushed by the relay to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayInbound {
    Connected,
    Disconnected,
    Event(RelayEvent),
}

/// Request/response side of the relay. Each call may fail on its own and is
/// never retried.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn create_room(&self) -> Result<CreateRoomReply, RelayError>;

    async fn join_room(&self, code: &str, name: &str) -> Result<JoinRoomReply, RelayError>;

    async fn approve_peer(
        &self,
        peer_id: &PeerId,
        approved: bool,
    ) -> Result<ApprovePeerReply, RelayError>;

    async fn signal(&self, to: &PeerId, payload: SignalPayload) -> Result<(), RelayError>;

    async fn close(&self);
}
