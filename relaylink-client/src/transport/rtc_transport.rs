use crate::error::TransportError;
use crate::transport::{ConnectionWrapper, DirectTransport, PeerConnection, TransportSink};
use async_trait::async_trait;
use relaylink_core::IceServerConfig;
use std::sync::Arc;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::interceptor::registry::Registry;

/// [`DirectTransport`] backed by webrtc-rs.
pub struct RtcTransport {
    api: API,
}

impl RtcTransport {
    pub fn new() -> Result<Self, TransportError> {
        // Codecs are registered even though only data channels are used;
        // the default interceptors expect them.
        let mut m = MediaEngine::default();
        m.register_default_codecs()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        let registry = register_default_interceptors(Registry::new(), &mut m)
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api })
    }
}

#[async_trait]
impl DirectTransport for RtcTransport {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        sink: TransportSink,
    ) -> Result<Arc<dyn PeerConnection>, TransportError> {
        let connection = ConnectionWrapper::new(&self.api, ice_servers, sink).await?;
        Ok(Arc::new(connection))
    }
}
