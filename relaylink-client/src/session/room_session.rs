use relaylink_core::{IceServerConfig, PeerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRole {
    Host,
    Guest,
}

/// A guest waiting for the host's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRequest {
    pub peer_id: PeerId,
    pub name: Option<String>,
}

/// Client-side view of the room this client created or joined.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSession {
    code: String,
    role: RoomRole,
    ice_servers: Vec<IceServerConfig>,
    pending_requests: Vec<PeerRequest>,
}

/// Room codes are compared case-insensitively; the joining side lower-cases them.
pub fn normalize_code(code: &str) -> String {
    code.to_lowercase()
}

impl RoomSession {
    pub fn host(code: impl Into<String>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            code: code.into(),
            role: RoomRole::Host,
            ice_servers,
            pending_requests: Vec::new(),
        }
    }

    pub fn guest(code: &str, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            code: normalize_code(code),
            role: RoomRole::Guest,
            ice_servers,
            pending_requests: Vec::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn role(&self) -> RoomRole {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == RoomRole::Host
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn pending_requests(&self) -> &[PeerRequest] {
        &self.pending_requests
    }

    pub(crate) fn add_request(&mut self, request: PeerRequest) {
        self.pending_requests
            .retain(|pending| pending.peer_id != request.peer_id);
        self.pending_requests.push(request);
    }

    pub(crate) fn resolve_request(&mut self, peer_id: &PeerId) -> Option<PeerRequest> {
        let index = self
            .pending_requests
            .iter()
            .position(|pending| &pending.peer_id == peer_id)?;
        Some(self.pending_requests.remove(index))
    }
}
