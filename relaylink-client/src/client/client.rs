use crate::client::{ClientCommand, Dispatcher};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::event::{ClientEvent, EventSink};
use crate::peer::PeerSnapshot;
use crate::relay::{Relay, RelayInbound, WsRelay};
use crate::session::{PeerRequest, RoomSession};
use crate::transport::{DirectTransport, RtcTransport};
use relaylink_core::{ApprovePeerReply, ChannelMessage, CreateRoomReply, JoinRoomReply, PeerId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// Handle to a running client.
///
/// Cloning is cheap; all clones drive the same event loop. The loop stops
/// after [`Client::disconnect`] or once every handle is dropped.
#[derive(Clone)]
pub struct Client {
    command_tx: mpsc::Sender<ClientCommand>,
}

impl Client {
    /// Start the event loop over the given capabilities. `inbound` is the
    /// relay's push side, as returned next to the relay by its constructor.
    pub fn start(
        config: ClientConfig,
        relay: Arc<dyn Relay>,
        inbound: mpsc::UnboundedReceiver<RelayInbound>,
        transport: Arc<dyn DirectTransport>,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher::new(
            config,
            relay,
            inbound,
            transport,
            command_rx,
            EventSink::new(event_tx),
        );
        tokio::spawn(dispatcher.run());

        (Self { command_tx }, event_rx)
    }

    /// Connect to `config.relay_url` over WebSocket and use WebRTC for the
    /// direct connections.
    pub async fn connect(
        config: ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        info!("Connecting to relay at {}", config.relay_url);
        let (relay, inbound) = WsRelay::connect(&config.relay_url, config.rpc_timeout).await?;
        let transport = RtcTransport::new()?;

        Ok(Self::start(
            config,
            Arc::new(relay),
            inbound,
            Arc::new(transport),
        ))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ClientCommand,
    ) -> Result<T, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .await
            .map_err(|_| ClientError::Closed)?;
        rx.await.map_err(|_| ClientError::Closed)
    }

    /// Ask the relay for a new room; on success this client becomes its host.
    pub async fn create_room(&self) -> Result<CreateRoomReply, ClientError> {
        self.request(|reply| ClientCommand::CreateRoom { reply })
            .await?
    }

    /// Join a room by code as a guest. `name` defaults to the configured one.
    /// The code is lower-cased before it is sent.
    pub async fn join_room(
        &self,
        code: &str,
        name: Option<&str>,
    ) -> Result<JoinRoomReply, ClientError> {
        let code = code.to_owned();
        let name = name.map(str::to_owned);
        self.request(|reply| ClientCommand::JoinRoom { code, name, reply })
            .await?
    }

    /// Host only. Tell the relay whether `peer_id` may join; admitting a
    /// peer also starts the offer to it.
    pub async fn approve_peer(
        &self,
        peer_id: &PeerId,
        approved: bool,
    ) -> Result<ApprovePeerReply, ClientError> {
        let peer_id = peer_id.clone();
        self.request(|reply| ClientCommand::ApprovePeer {
            peer_id,
            approved,
            reply,
        })
        .await?
    }

    /// Same as `approve_peer(peer_id, false)`.
    pub async fn deny_peer(&self, peer_id: &PeerId) -> Result<ApprovePeerReply, ClientError> {
        self.approve_peer(peer_id, false).await
    }

    /// Send over the peer's data channel. Returns `false` when there is no
    /// open channel to it or the send failed.
    pub async fn send(&self, peer_id: &PeerId, message: impl Into<ChannelMessage>) -> bool {
        let peer_id = peer_id.clone();
        let message = message.into();
        self.request(|reply| ClientCommand::Send {
            peer_id,
            message,
            reply,
        })
        .await
        .unwrap_or(false)
    }

    /// Send to every peer with an open channel. Returns how many got it.
    pub async fn broadcast(&self, message: impl Into<ChannelMessage>) -> usize {
        let message = message.into();
        self.request(|reply| ClientCommand::Broadcast { message, reply })
            .await
            .unwrap_or(0)
    }

    /// Close and forget the peer's connection. Idempotent.
    pub async fn remove_peer(&self, peer_id: &PeerId) -> bool {
        let peer_id = peer_id.clone();
        self.request(|reply| ClientCommand::RemovePeer { peer_id, reply })
            .await
            .unwrap_or(false)
    }

    /// Close every peer and the relay connection, then stop the event loop.
    pub async fn disconnect(&self) {
        let _ = self
            .request(|reply| ClientCommand::Disconnect { reply })
            .await;
    }

    pub async fn session(&self) -> Option<RoomSession> {
        self.request(|reply| ClientCommand::Session { reply })
            .await
            .ok()
            .flatten()
    }

    pub async fn peers(&self) -> Vec<PeerSnapshot> {
        self.request(|reply| ClientCommand::Peers { reply })
            .await
            .unwrap_or_default()
    }

    /// Candidates held for `peer_id` before it had a record.
    pub async fn early_candidates(&self, peer_id: &PeerId) -> usize {
        let peer_id = peer_id.clone();
        self.request(|reply| ClientCommand::EarlyCandidates { peer_id, reply })
            .await
            .unwrap_or(0)
    }

    /// Guests still waiting for a host decision.
    pub async fn pending_requests(&self) -> Vec<PeerRequest> {
        self.request(|reply| ClientCommand::PendingRequests { reply })
            .await
            .unwrap_or_default()
    }
}
