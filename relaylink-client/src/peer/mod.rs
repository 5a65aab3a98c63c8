mod candidate_buffer;
mod early_candidates;
mod peer_record;
mod peer_registry;

pub use candidate_buffer::CandidateBuffer;
pub use early_candidates::{EarlyCandidates, EarlyOutcome};
pub use peer_record::{NegotiationRole, NegotiationState, PeerRecord, PeerSnapshot};
pub use peer_registry::PeerRegistry;
