use crate::error::TransportError;
use crate::transport::{DataChannel, TransportEvent, TransportSink};
use async_trait::async_trait;
use relaylink_core::ChannelMessage;
use std::sync::Arc;
use tracing::info;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

pub struct RtcChannel {
    inner: Arc<RTCDataChannel>,
}

impl RtcChannel {
    pub fn new(inner: Arc<RTCDataChannel>) -> Self {
        Self { inner }
    }

    /// Forward open/message/close of the channel into `sink`.
    pub fn watch(&self, sink: TransportSink) {
        let open_sink = sink.clone();
        self.inner.on_open(Box::new(move || {
            Box::pin(async move {
                info!("DataChannel open for {:?}", open_sink.peer_id());
                open_sink.emit(TransportEvent::ChannelOpen);
            })
        }));

        let msg_sink = sink.clone();
        self.inner.on_message(Box::new(move |msg: DataChannelMessage| {
            let sink = msg_sink.clone();
            Box::pin(async move {
                let message = if msg.is_string {
                    ChannelMessage::Text(String::from_utf8_lossy(&msg.data).into_owned())
                } else {
                    ChannelMessage::Binary(msg.data)
                };
                sink.emit(TransportEvent::ChannelMessage(message));
            })
        }));

        self.inner.on_close(Box::new(move || {
            let sink = sink.clone();
            Box::pin(async move {
                info!("DataChannel closed for {:?}", sink.peer_id());
                sink.emit(TransportEvent::ChannelClosed);
            })
        }));
    }
}

#[async_trait]
impl DataChannel for RtcChannel {
    fn label(&self) -> String {
        self.inner.label().to_owned()
    }

    fn is_open(&self) -> bool {
        self.inner.ready_state() == RTCDataChannelState::Open
    }

    async fn send(&self, message: &ChannelMessage) -> Result<(), TransportError> {
        let res = match message {
            ChannelMessage::Text(text) => self.inner.send_text(text.clone()).await,
            ChannelMessage::Binary(data) => self.inner.send(data).await,
        };
        res.map(|_| ())
            .map_err(|e| TransportError::Channel(e.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner
            .close()
            .await
            .map_err(|e| TransportError::Channel(e.to_string()))
    }
}
