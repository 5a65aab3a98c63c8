use crate::error::RelayError;
use crate::relay::{Relay, RelayInbound};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use relaylink_core::{
    ApprovePeerParams, ApprovePeerReply, CreateRoomReply, JoinRoomParams, JoinRoomReply, PeerId,
    RelayEvent, RelayFrame, RelayMethod, RequestId, SignalParams, SignalPayload,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

type Pending = DashMap<RequestId, oneshot::Sender<Result<Value, RelayError>>>;

/// [`Relay`] over a single WebSocket carrying JSON [`RelayFrame`]s.
pub struct WsRelay {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: Arc<Pending>,
    /// Set once the reader task has seen the socket end.
    closed: Arc<AtomicBool>,
    rpc_timeout: Duration,
}

impl WsRelay {
    /// Open the socket. Inbound notifications, including `Connected` and the
    /// final `Disconnected`, arrive on the returned receiver.
    pub async fn connect(
        url: &str,
        rpc_timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RelayInbound>), RelayError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| RelayError::Connect(e.to_string()))?;
        info!("Connected to relay at {}", url);

        let (mut sender, mut receiver) = socket.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let pending: Arc<Pending> = Arc::new(DashMap::new());
        let closed = Arc::new(AtomicBool::new(false));

        let _ = inbound_tx.send(RelayInbound::Connected);

        tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if sender.send(msg).await.is_err() || closing {
                    break;
                }
            }
        });

        tokio::spawn({
            let pending = pending.clone();
            let closed = closed.clone();

            async move {
                while let Some(msg) = receiver.next().await {
                    match msg {
                        Ok(Message::Text(text)) => {
                            Self::handle_frame(text.as_str(), &pending, &inbound_tx)
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Relay socket error: {}", e);
                            break;
                        }
                    }
                }

                // Dropping the reply senders fails every in-flight request.
                closed.store(true, Ordering::SeqCst);
                pending.clear();
                info!("Relay connection closed");
                let _ = inbound_tx.send(RelayInbound::Disconnected);
            }
        });

        let relay = Self {
            outgoing,
            pending,
            closed,
            rpc_timeout,
        };
        Ok((relay, inbound_rx))
    }

    fn handle_frame(
        text: &str,
        pending: &Pending,
        inbound_tx: &mpsc::UnboundedSender<RelayInbound>,
    ) {
        let frame = match RelayFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping undecodable relay frame: {}", e);
                return;
            }
        };

        match frame {
            RelayFrame::Response { id, result, error } => {
                let Some((_, reply)) = pending.remove(&id) else {
                    debug!("Response for unknown or expired request {}", id);
                    return;
                };
                let outcome = match error {
                    Some(reason) => Err(RelayError::Rejected(reason)),
                    None => Ok(result.unwrap_or(Value::Null)),
                };
                let _ = reply.send(outcome);
            }
            RelayFrame::Event { event, data } => match RelayEvent::decode(&event, data) {
                Ok(event) => {
                    let _ = inbound_tx.send(RelayInbound::Event(event));
                }
                Err(e) => warn!("Dropping relay event: {}", e),
            },
            RelayFrame::Request { method, .. } => {
                warn!("Ignoring unexpected '{}' request from relay", method);
            }
        }
    }

    async fn call<P, R>(&self, method: RelayMethod, params: P) -> Result<R, RelayError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = RequestId::new();
        let params = serde_json::to_value(params).map_err(|e| RelayError::Send(e.to_string()))?;
        let json = RelayFrame::Request { id, method, params }.encode()?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.insert(id, reply_tx);

        // Read after the insert, so a concurrent close still clears this entry.
        if self.closed.load(Ordering::SeqCst)
            || self.outgoing.send(Message::Text(json.into())).is_err()
        {
            self.pending.remove(&id);
            return Err(RelayError::Disconnected);
        }

        let value = match tokio::time::timeout(self.rpc_timeout, reply_rx).await {
            Ok(Ok(outcome)) => outcome?,
            Ok(Err(_)) => return Err(RelayError::Disconnected),
            Err(_) => {
                self.pending.remove(&id);
                error!("Relay request '{}' timed out", method);
                return Err(RelayError::Timeout);
            }
        };

        serde_json::from_value(value).map_err(|e| RelayError::Decode(e.into()))
    }
}

#[async_trait]
impl Relay for WsRelay {
    async fn create_room(&self) -> Result<CreateRoomReply, RelayError> {
        self.call(RelayMethod::CreateRoom, Value::Null).await
    }

    async fn join_room(&self, code: &str, name: &str) -> Result<JoinRoomReply, RelayError> {
        let params = JoinRoomParams {
            code: code.to_owned(),
            name: name.to_owned(),
        };
        self.call(RelayMethod::JoinRoom, params).await
    }

    async fn approve_peer(
        &self,
        peer_id: &PeerId,
        approved: bool,
    ) -> Result<ApprovePeerReply, RelayError> {
        let params = ApprovePeerParams {
            peer_id: peer_id.clone(),
            approved,
        };
        self.call(RelayMethod::ApprovePeer, params).await
    }

    async fn signal(&self, to: &PeerId, payload: SignalPayload) -> Result<(), RelayError> {
        let params = SignalParams {
            to: to.clone(),
            payload,
        };
        let _: Value = self.call(RelayMethod::Signal, params).await?;
        Ok(())
    }

    async fn close(&self) {
        let _ = self.outgoing.send(Message::Close(None));
    }
}
