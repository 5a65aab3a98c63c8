pub use relaylink_core::PeerId;

pub mod model {
    pub use relaylink_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use relaylink_client::*;
}

#[cfg(feature = "client")]
pub use relaylink_client::{Client, ClientConfig, ClientEvent};
