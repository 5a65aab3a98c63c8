use relaylink_core::IceServerConfig;
use std::time::Duration;

/// Bounds for candidates that arrive before their peer has a record.
#[derive(Debug, Clone)]
pub struct EarlyCandidateLimits {
    /// Distinct peers tracked at once; the oldest entry is evicted first.
    pub max_peers: usize,
    /// Candidates kept per peer; later ones are dropped.
    pub max_per_peer: usize,
    /// Lifetime of an entry.
    pub ttl: Duration,
}

impl Default for EarlyCandidateLimits {
    fn default() -> Self {
        Self {
            max_peers: 64,
            max_per_peer: 128,
            ttl: Duration::from_secs(30),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    /// Display name sent with `join_room` when the caller gives none.
    pub name: String,
    /// Used until a room distributes its own server list.
    pub ice_servers: Vec<IceServerConfig>,
    pub rpc_timeout: Duration,
    pub data_channel_label: String,
    /// Host admits every requesting guest without asking.
    pub auto_approve: bool,
    pub early_candidates: EarlyCandidateLimits,
    pub sweep_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://127.0.0.1:3000/ws".to_owned(),
            name: "Anonymous".to_owned(),
            ice_servers: IceServerConfig::defaults(),
            rpc_timeout: Duration::from_secs(10),
            data_channel_label: "data".to_owned(),
            auto_approve: false,
            early_candidates: EarlyCandidateLimits::default(),
            sweep_interval: Duration::from_secs(5),
        }
    }
}
