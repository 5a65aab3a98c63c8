//! Client core for peer-to-peer rooms brokered by a signaling relay.
//!
//! A host creates a room, approves guests, and offers each one a direct
//! connection; guests answer. The relay only carries room management and
//! the offer/answer/candidate messages. Application data flows over the
//! direct connections' data channels.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
mod negotiation;
pub mod peer;
pub mod relay;
pub mod session;
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, EarlyCandidateLimits};
pub use error::{ClientError, RelayError, TransportError};
pub use event::ClientEvent;
pub use peer::{NegotiationRole, NegotiationState, PeerSnapshot};
pub use relay::{Relay, RelayInbound, WsRelay};
pub use session::{PeerRequest, RoomRole, RoomSession};
pub use transport::{DataChannel, DirectTransport, PeerConnection, RtcTransport, TransportSink};

pub use relaylink_core::{
    ChannelMessage, ConnectionState, IceServerConfig, PeerId, SdpKind, SignalPayload,
};
