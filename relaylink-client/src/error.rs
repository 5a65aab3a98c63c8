use relaylink_core::{DecodeError, PeerId};
use thiserror::Error;

/// Failures of the direct-transport capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("negotiation step failed: {0}")]
    Negotiation(String),

    #[error("candidate rejected: {0}")]
    Candidate(String),

    #[error("data channel error: {0}")]
    Channel(String),

    #[error("connection closed")]
    Closed,

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the relay capability.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to connect to relay: {0}")]
    Connect(String),

    #[error("failed to send to relay: {0}")]
    Send(String),

    #[error("relay request timed out")]
    Timeout,

    #[error("relay rejected request: {0}")]
    Rejected(String),

    #[error("relay disconnected")]
    Disconnected,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failures surfaced by [`crate::Client`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("a negotiation record already exists for peer {0}")]
    PeerExists(PeerId),

    #[error("only the room host can do this")]
    NotHost,

    #[error("client event loop has stopped")]
    Closed,
}
