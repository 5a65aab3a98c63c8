mod capability;
mod connection_wrapper;
mod rtc_channel;
mod rtc_transport;
mod transport_event;

pub use capability::{DataChannel, DirectTransport, PeerConnection};
pub use connection_wrapper::ConnectionWrapper;
pub use rtc_channel::RtcChannel;
pub use rtc_transport::RtcTransport;
pub use transport_event::{PeerEvent, TransportEvent, TransportSink};
