mod room_session;

pub use room_session::{PeerRequest, RoomRole, RoomSession, normalize_code};
