use crate::negotiation::NegotiationController;
use crate::peer::{EarlyOutcome, PeerRegistry};
use relaylink_core::{Candidate, PeerId};
use std::time::Instant;
use tracing::{debug, trace, warn};

impl NegotiationController {
    /// Apply a remote candidate, or hold it until it can be applied.
    ///
    /// - no record: kept in the registry's early buffer
    /// - remote description not applied yet: appended to the record's buffer
    /// - otherwise: applied now; a rejection is logged and counted
    pub(crate) async fn handle_candidate(
        &self,
        registry: &mut PeerRegistry,
        from: &PeerId,
        candidate: Candidate,
    ) {
        let Some(record) = registry.get_mut(from) else {
            match registry.buffer_early(from, candidate, Instant::now()) {
                EarlyOutcome::Buffered => {
                    debug!("Buffered early candidate for {:?}", from)
                }
                EarlyOutcome::Dropped => {
                    debug!("Dropped early candidate for {:?}", from)
                }
            }
            return;
        };

        if !record.has_remote_description {
            record.pending_candidates.push(candidate);
            trace!(
                "Buffered candidate for {:?} ({} pending)",
                from,
                record.pending_candidates.len()
            );
            return;
        }

        let generation = record.generation;
        let connection = record.connection.clone();
        if let Err(e) = connection.add_candidate(&candidate).await {
            warn!("Candidate from {:?} rejected: {}", from, e);
            if let Some(record) = registry.get_current(from, generation) {
                record.rejected_candidates += 1;
            }
        }
    }
}
