mod channel;
mod connection;
mod peer;
mod relay;
mod request;
mod signaling;

pub use channel::ChannelMessage;
pub use connection::ConnectionState;
pub use peer::PeerId;
pub use relay::{
    ApprovePeerParams, ApprovePeerReply, CreateRoomReply, DecodeError, JoinRoomParams,
    JoinRoomReply, RelayEvent, RelayFrame, RelayMethod, SignalParams,
};
pub use request::RequestId;
pub use signaling::{
    Candidate, DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, IceServerConfig, SdpKind, SignalPayload,
};
