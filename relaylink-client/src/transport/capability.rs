use crate::error::TransportError;
use crate::transport::TransportSink;
use async_trait::async_trait;
use relaylink_core::{Candidate, ChannelMessage, IceServerConfig, SdpKind};
use std::sync::Arc;

/// Factory for direct connections, injected into the client at construction.
///
/// Every notification of the created connection (discovered candidates,
/// state changes, data-channel activity) is pushed into `sink`.
#[async_trait]
pub trait DirectTransport: Send + Sync {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        sink: TransportSink,
    ) -> Result<Arc<dyn PeerConnection>, TransportError>;
}

/// One direct connection to one remote peer.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Create an offer and install it as the local description.
    async fn create_offer(&self) -> Result<String, TransportError>;

    /// Create an answer to the applied remote offer and install it as the
    /// local description.
    async fn create_answer(&self) -> Result<String, TransportError>;

    async fn set_remote_description(&self, kind: SdpKind, sdp: String)
    -> Result<(), TransportError>;

    /// Fails with [`TransportError::Candidate`] on a malformed or stale hint.
    async fn add_candidate(&self, candidate: &Candidate) -> Result<(), TransportError>;

    async fn create_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> String;

    fn is_open(&self) -> bool;

    async fn send(&self, message: &ChannelMessage) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}
