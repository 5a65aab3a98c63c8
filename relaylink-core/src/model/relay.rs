use crate::model::peer::PeerId;
use crate::model::request::RequestId;
use crate::model::signaling::{IceServerConfig, SignalPayload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed relay frame: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("unknown relay event '{0}'")]
    UnknownEvent(String),

    #[error("malformed payload for relay event '{event}': {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One JSON text frame on the relay socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayFrame {
    Request {
        id: RequestId,
        method: RelayMethod,
        #[serde(default)]
        params: Value,
    },
    Response {
        id: RequestId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Event {
        event: String,
        #[serde(default)]
        data: Value,
    },
}

impl RelayFrame {
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayMethod {
    CreateRoom,
    JoinRoom,
    ApprovePeer,
    Signal,
}

impl fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateRoom => "createRoom",
            Self::JoinRoom => "joinRoom",
            Self::ApprovePeer => "approvePeer",
            Self::Signal => "signal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomParams {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePeerParams {
    pub peer_id: PeerId,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    pub to: PeerId,
    pub payload: SignalPayload,
}

/// Result of `createRoom`. Fields the client does not interpret are kept in
/// `extra` so callers can inspect them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_servers: Option<Vec<IceServerConfig>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_servers: Option<Vec<IceServerConfig>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovePeerReply {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Notification pushed by the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    PeerRequest {
        peer_id: PeerId,
        name: Option<String>,
    },
    PeerApproved {
        host_id: Option<PeerId>,
    },
    PeerDenied,
    PeerDisconnected {
        peer_id: PeerId,
    },
    HostDisconnected,
    HostReconnected {
        host_id: Option<PeerId>,
    },
    /// `payload` is decoded later, once the sender is known.
    Signal {
        from: PeerId,
        payload: Value,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeerRef {
    peer_id: PeerId,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostRef {
    #[serde(default)]
    host_id: Option<PeerId>,
}

#[derive(Deserialize)]
struct SignalRef {
    from: PeerId,
    payload: Value,
}

fn from_data<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, DecodeError> {
    let data = if data.is_null() {
        Value::Object(Map::new())
    } else {
        data
    };
    serde_json::from_value(data).map_err(|source| DecodeError::Payload {
        event: event.to_owned(),
        source,
    })
}

impl RelayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PeerRequest { .. } => "peer:request",
            Self::PeerApproved { .. } => "peer:approved",
            Self::PeerDenied => "peer:denied",
            Self::PeerDisconnected { .. } => "peer:disconnected",
            Self::HostDisconnected => "host:disconnected",
            Self::HostReconnected { .. } => "host:reconnected",
            Self::Signal { .. } => "signal",
        }
    }

    pub fn decode(event: &str, data: Value) -> Result<Self, DecodeError> {
        match event {
            "peer:request" => {
                let PeerRef { peer_id, name } = from_data(event, data)?;
                Ok(Self::PeerRequest { peer_id, name })
            }
            "peer:approved" => {
                let HostRef { host_id } = from_data(event, data)?;
                Ok(Self::PeerApproved { host_id })
            }
            "peer:denied" => Ok(Self::PeerDenied),
            "peer:disconnected" => {
                let PeerRef { peer_id, .. } = from_data(event, data)?;
                Ok(Self::PeerDisconnected { peer_id })
            }
            "host:disconnected" => Ok(Self::HostDisconnected),
            "host:reconnected" => {
                let HostRef { host_id } = from_data(event, data)?;
                Ok(Self::HostReconnected { host_id })
            }
            "signal" => {
                let SignalRef { from, payload } = from_data(event, data)?;
                Ok(Self::Signal { from, payload })
            }
            other => Err(DecodeError::UnknownEvent(other.to_owned())),
        }
    }

    pub fn encode(&self) -> (&'static str, Value) {
        let data = match self {
            Self::PeerRequest { peer_id, name } => json!({ "peerId": peer_id, "name": name }),
            Self::PeerApproved { host_id } | Self::HostReconnected { host_id } => {
                json!({ "hostId": host_id })
            }
            Self::PeerDisconnected { peer_id } => json!({ "peerId": peer_id }),
            Self::PeerDenied | Self::HostDisconnected => Value::Null,
            Self::Signal { from, payload } => json!({ "from": from, "payload": payload }),
        };
        (self.name(), data)
    }

    pub fn into_frame(self) -> RelayFrame {
        let (event, data) = self.encode();
        RelayFrame::Event {
            event: event.to_owned(),
            data,
        }
    }
}
