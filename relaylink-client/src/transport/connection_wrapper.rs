use crate::error::TransportError;
use crate::transport::{DataChannel, PeerConnection, RtcChannel, TransportEvent, TransportSink};
use async_trait::async_trait;
use relaylink_core::{Candidate, ConnectionState, IceServerConfig, SdpKind};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::API;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Candidate as it arrives from the other side: either the browser shape
/// (`sdpMid`, `sdpMLineIndex`) or the compact `{candidate, mid}` shape.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateInit {
    candidate: String,
    #[serde(default, alias = "mid")]
    sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    sdp_mline_index: Option<u16>,
    #[serde(default)]
    username_fragment: Option<String>,
}

impl From<CandidateInit> for RTCIceCandidateInit {
    fn from(c: CandidateInit) -> Self {
        let sdp_mid = match (c.sdp_mid, c.sdp_mline_index) {
            (None, None) => Some("0".to_owned()),
            (mid, _) => mid,
        };
        RTCIceCandidateInit {
            candidate: c.candidate,
            sdp_mid,
            sdp_mline_index: c.sdp_mline_index,
            username_fragment: c.username_fragment,
        }
    }
}

fn map_state(s: RTCPeerConnectionState) -> Option<ConnectionState> {
    match s {
        RTCPeerConnectionState::New => Some(ConnectionState::New),
        RTCPeerConnectionState::Connecting => Some(ConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(ConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(ConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(ConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(ConnectionState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}

fn negotiation(e: webrtc::Error) -> TransportError {
    TransportError::Negotiation(e.to_string())
}

/// webrtc-rs peer connection with its callbacks wired into a [`TransportSink`].
pub struct ConnectionWrapper {
    sink: TransportSink,
    peer_connection: Arc<RTCPeerConnection>,
}

impl ConnectionWrapper {
    pub async fn new(
        api: &API,
        ice_servers: &[IceServerConfig],
        sink: TransportSink,
    ) -> Result<Self, TransportError> {
        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| TransportError::Unavailable(e.to_string()))?,
        );

        let state_sink = sink.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let sink = state_sink.clone();

                Box::pin(async move {
                    info!("Peer connection state for {:?}: {:?}", sink.peer_id(), s);
                    if let Some(state) = map_state(s) {
                        sink.emit(TransportEvent::StateChanged(state));
                    }
                })
            },
        ));

        // Trickle: every local candidate leaves as soon as it is found.
        let ice_sink = sink.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let sink = ice_sink.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                match serde_json::to_value(&init) {
                    Ok(value) => sink.emit(TransportEvent::CandidateDiscovered(Candidate(value))),
                    Err(e) => warn!("Failed to encode local candidate: {}", e),
                }
            })
        }));

        let dc_sink = sink.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let sink = dc_sink.clone();

            Box::pin(async move {
                debug!(
                    "Remote DataChannel '{}' received from {:?}",
                    dc.label(),
                    sink.peer_id()
                );
                let channel = Arc::new(RtcChannel::new(dc));
                sink.emit(TransportEvent::ChannelReceived(channel.clone()));
                channel.watch(sink);
            })
        }));

        Ok(Self {
            sink,
            peer_connection,
        })
    }
}

#[async_trait]
impl PeerConnection for ConnectionWrapper {
    async fn create_offer(&self) -> Result<String, TransportError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(negotiation)?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(negotiation)?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(negotiation)?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(negotiation)?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), TransportError> {
        let desc = match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp),
            SdpKind::Answer => RTCSessionDescription::answer(sdp),
        }
        .map_err(negotiation)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(negotiation)
    }

    async fn add_candidate(&self, candidate: &Candidate) -> Result<(), TransportError> {
        let init: CandidateInit = serde_json::from_value(candidate.0.clone())
            .map_err(|e| TransportError::Candidate(e.to_string()))?;
        self.peer_connection
            .add_ice_candidate(init.into())
            .await
            .map_err(|e| TransportError::Candidate(e.to_string()))
    }

    async fn create_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>, TransportError> {
        let dc = self
            .peer_connection
            .create_data_channel(label, None)
            .await
            .map_err(|e| TransportError::Channel(e.to_string()))?;
        let channel = Arc::new(RtcChannel::new(dc));
        channel.watch(self.sink.clone());
        Ok(channel)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| TransportError::Unavailable(e.to_string()))
    }
}
