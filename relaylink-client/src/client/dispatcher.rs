use crate::client::ClientCommand;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::event::{ClientEvent, EventSink};
use crate::negotiation::NegotiationController;
use crate::peer::PeerRegistry;
use crate::relay::{Relay, RelayInbound};
use crate::session::{PeerRequest, RoomSession, normalize_code};
use crate::transport::{DirectTransport, PeerEvent};
use relaylink_core::{
    ApprovePeerReply, ChannelMessage, ConnectionState, CreateRoomReply, IceServerConfig,
    JoinRoomReply, PeerId, RelayEvent, SignalPayload,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// The client's event loop. Owns the session and every negotiation record,
/// and handles one command, relay event or transport event at a time.
pub(crate) struct Dispatcher {
    config: ClientConfig,
    relay: Arc<dyn Relay>,
    registry: PeerRegistry,
    controller: NegotiationController,
    session: Option<RoomSession>,
    events: EventSink,
    command_rx: mpsc::Receiver<ClientCommand>,
    inbound_rx: mpsc::UnboundedReceiver<RelayInbound>,
    peer_event_rx: mpsc::UnboundedReceiver<PeerEvent>,
}

impl Dispatcher {
    pub(crate) fn new(
        config: ClientConfig,
        relay: Arc<dyn Relay>,
        inbound_rx: mpsc::UnboundedReceiver<RelayInbound>,
        transport: Arc<dyn DirectTransport>,
        command_rx: mpsc::Receiver<ClientCommand>,
        events: EventSink,
    ) -> Self {
        let (peer_event_tx, peer_event_rx) = mpsc::unbounded_channel();
        let registry = PeerRegistry::new(
            transport,
            peer_event_tx,
            config.early_candidates.clone(),
        );
        let controller = NegotiationController::new(
            relay.clone(),
            events.clone(),
            config.data_channel_label.clone(),
        );

        Self {
            config,
            relay,
            registry,
            controller,
            session: None,
            events,
            command_rx,
            inbound_rx,
            peer_event_rx,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Client event loop started");

        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut relay_open = true;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ClientCommand::Disconnect { reply }) => {
                            self.shutdown().await;
                            let _ = reply.send(());
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All client handles dropped. Shutting down.");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                inbound = self.inbound_rx.recv(), if relay_open => {
                    match inbound {
                        Some(i) => self.handle_inbound(i).await,
                        None => {
                            debug!("Relay inbound channel closed");
                            relay_open = false;
                        }
                    }
                }

                Some(evt) = self.peer_event_rx.recv() => {
                    self.controller.handle_transport_event(&mut self.registry, evt).await;
                }

                _ = sweep.tick() => {
                    self.registry.sweep(Instant::now());
                }
            }
        }

        info!("Client event loop finished");
    }

    async fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::CreateRoom { reply } => {
                let _ = reply.send(self.create_room().await);
            }
            ClientCommand::JoinRoom { code, name, reply } => {
                let _ = reply.send(self.join_room(&code, name).await);
            }
            ClientCommand::ApprovePeer {
                peer_id,
                approved,
                reply,
            } => {
                let _ = reply.send(self.approve_peer(&peer_id, approved).await);
            }
            ClientCommand::Send {
                peer_id,
                message,
                reply,
            } => {
                let _ = reply.send(self.send(&peer_id, &message).await);
            }
            ClientCommand::Broadcast { message, reply } => {
                let _ = reply.send(self.broadcast(&message).await);
            }
            ClientCommand::RemovePeer { peer_id, reply } => {
                let removed = self.registry.remove(&peer_id).await;
                let _ = reply.send(removed);
            }
            ClientCommand::Session { reply } => {
                let _ = reply.send(self.session.clone());
            }
            ClientCommand::Peers { reply } => {
                let _ = reply.send(self.registry.snapshots());
            }
            ClientCommand::EarlyCandidates { peer_id, reply } => {
                let _ = reply.send(self.registry.early_count(&peer_id));
            }
            ClientCommand::PendingRequests { reply } => {
                let pending = self
                    .session
                    .as_ref()
                    .map(|session| session.pending_requests().to_vec())
                    .unwrap_or_default();
                let _ = reply.send(pending);
            }
            ClientCommand::Disconnect { reply } => {
                // Handled by the run loop.
                let _ = reply.send(());
            }
        }
    }

    async fn handle_inbound(&mut self, inbound: RelayInbound) {
        match inbound {
            RelayInbound::Connected => {
                info!("Connected to relay");
                self.events.emit(ClientEvent::Connected);
            }
            RelayInbound::Disconnected => {
                warn!("Relay connection lost");
                self.registry.remove_all().await;
                self.session = None;
                self.events.emit(ClientEvent::Disconnected);
            }
            RelayInbound::Event(event) => self.handle_relay_event(event).await,
        }
    }

    async fn handle_relay_event(&mut self, event: RelayEvent) {
        debug!("Relay event {}", event.name());

        match event {
            RelayEvent::PeerRequest { peer_id, name } => {
                self.events.emit(ClientEvent::PeerRequest {
                    peer_id: peer_id.clone(),
                    name: name.clone(),
                });

                let Some(session) = self.session.as_mut().filter(|s| s.is_host()) else {
                    warn!("Peer request from {:?} while not hosting", peer_id);
                    return;
                };
                session.add_request(PeerRequest {
                    peer_id: peer_id.clone(),
                    name,
                });

                if self.config.auto_approve {
                    info!("Auto-approving {:?}", peer_id);
                    if let Err(e) = self.approve_peer(&peer_id, true).await {
                        error!("Auto-approve of {:?} failed: {}", peer_id, e);
                    }
                }
            }
            RelayEvent::PeerApproved { host_id } => {
                info!("Admitted to room by host {:?}", host_id);
                self.events.emit(ClientEvent::PeerApproved { host_id });
            }
            RelayEvent::PeerDenied => {
                info!("Host denied our request");
                self.events.emit(ClientEvent::PeerDenied);
            }
            RelayEvent::PeerDisconnected { peer_id } => {
                self.registry.remove(&peer_id).await;
                if let Some(session) = self.session.as_mut() {
                    session.resolve_request(&peer_id);
                }
                self.events.emit(ClientEvent::PeerDisconnected { peer_id });
            }
            RelayEvent::HostDisconnected => {
                self.events.emit(ClientEvent::HostDisconnected);
            }
            RelayEvent::HostReconnected { host_id } => {
                self.events.emit(ClientEvent::HostReconnected { host_id });
            }
            RelayEvent::Signal { from, payload } => {
                let payload: SignalPayload = match serde_json::from_value(payload) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("Dropping malformed signal from {:?}: {}", from, e);
                        return;
                    }
                };
                self.handle_signal(from, payload).await;
            }
        }
    }

    async fn handle_signal(&mut self, from: PeerId, payload: SignalPayload) {
        match payload {
            SignalPayload::Offer { sdp } => {
                let ice_servers = self.ice_servers();
                self.controller
                    .handle_offer(&mut self.registry, &from, sdp, &ice_servers)
                    .await;
            }
            SignalPayload::Answer { sdp } => {
                self.controller
                    .handle_answer(&mut self.registry, &from, sdp)
                    .await;
            }
            SignalPayload::Candidate { candidate } => {
                self.controller
                    .handle_candidate(&mut self.registry, &from, candidate)
                    .await;
            }
        }
    }

    async fn create_room(&mut self) -> Result<CreateRoomReply, ClientError> {
        let reply = self.relay.create_room().await?;

        match &reply.code {
            Some(code) => {
                let ice_servers = reply
                    .ice_servers
                    .clone()
                    .unwrap_or_else(|| self.config.ice_servers.clone());
                info!("Hosting room {}", code);
                self.session = Some(RoomSession::host(code.clone(), ice_servers));
            }
            None => warn!("createRoom reply carried no room code"),
        }
        Ok(reply)
    }

    async fn join_room(
        &mut self,
        code: &str,
        name: Option<String>,
    ) -> Result<JoinRoomReply, ClientError> {
        let code = normalize_code(code);
        let name = name.unwrap_or_else(|| self.config.name.clone());
        let reply = self.relay.join_room(&code, &name).await?;

        if reply.success {
            let ice_servers = reply
                .ice_servers
                .clone()
                .unwrap_or_else(|| self.config.ice_servers.clone());
            info!("Joined room {} as {}", code, name);
            self.session = Some(RoomSession::guest(&code, ice_servers));
        } else {
            info!("Join of room {} was not accepted", code);
        }
        Ok(reply)
    }

    /// Forward the decision to the relay. On a confirmed approval the host
    /// starts the offer; a failure there is reported through events rather
    /// than through the returned result.
    async fn approve_peer(
        &mut self,
        peer_id: &PeerId,
        approved: bool,
    ) -> Result<ApprovePeerReply, ClientError> {
        if !self.session.as_ref().is_some_and(RoomSession::is_host) {
            return Err(ClientError::NotHost);
        }

        let reply = self.relay.approve_peer(peer_id, approved).await?;
        if let Some(session) = self.session.as_mut() {
            session.resolve_request(peer_id);
        }

        if reply.success && approved {
            let ice_servers = self.ice_servers();
            if let Err(e) = self
                .controller
                .start_offer(&mut self.registry, peer_id, &ice_servers)
                .await
            {
                error!("Could not start negotiation with {:?}: {}", peer_id, e);
                self.registry.remove(peer_id).await;
                self.events.emit(ClientEvent::PeerConnectionState {
                    peer_id: peer_id.clone(),
                    state: ConnectionState::Failed,
                });
            }
        }
        Ok(reply)
    }

    async fn send(&self, peer_id: &PeerId, message: &ChannelMessage) -> bool {
        let Some(channel) = self.registry.get(peer_id).and_then(|r| r.open_channel()) else {
            debug!("No open channel to {:?}", peer_id);
            return false;
        };
        match channel.send(message).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Send to {:?} failed: {}", peer_id, e);
                false
            }
        }
    }

    async fn broadcast(&self, message: &ChannelMessage) -> usize {
        let channels: Vec<_> = self
            .registry
            .records()
            .filter_map(|record| Some((record.peer_id.clone(), record.open_channel()?)))
            .collect();

        let mut sent = 0;
        for (peer_id, channel) in channels {
            match channel.send(message).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Broadcast to {:?} failed: {}", peer_id, e),
            }
        }
        sent
    }

    async fn shutdown(&mut self) {
        info!("Disconnecting client");
        self.registry.remove_all().await;
        self.session = None;
        self.relay.close().await;
        self.events.emit(ClientEvent::Disconnected);
    }

    fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.session
            .as_ref()
            .map(|session| session.ice_servers().to_vec())
            .unwrap_or_else(|| self.config.ice_servers.clone())
    }
}
