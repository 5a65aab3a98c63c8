use crate::config::EarlyCandidateLimits;
use crate::error::ClientError;
use crate::peer::{
    EarlyCandidates, EarlyOutcome, NegotiationRole, NegotiationState, PeerRecord, PeerSnapshot,
};
use crate::transport::{DirectTransport, PeerEvent, TransportSink};
use relaylink_core::{Candidate, IceServerConfig, PeerId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns every [`PeerRecord`], plus the candidates that arrived for peers
/// without one.
pub struct PeerRegistry {
    transport: Arc<dyn DirectTransport>,
    event_tx: mpsc::UnboundedSender<PeerEvent>,
    records: HashMap<PeerId, PeerRecord>,
    early: EarlyCandidates,
    next_generation: u64,
}

impl PeerRegistry {
    pub fn new(
        transport: Arc<dyn DirectTransport>,
        event_tx: mpsc::UnboundedSender<PeerEvent>,
        limits: EarlyCandidateLimits,
    ) -> Self {
        Self {
            transport,
            event_tx,
            records: HashMap::new(),
            early: EarlyCandidates::new(limits),
            next_generation: 1,
        }
    }

    /// Allocate a record in `Created` with a fresh connection. Candidates
    /// that arrived early for this peer are moved into its buffer.
    pub async fn create(
        &mut self,
        peer_id: &PeerId,
        role: NegotiationRole,
        ice_servers: &[IceServerConfig],
    ) -> Result<&mut PeerRecord, ClientError> {
        if self.records.contains_key(peer_id) {
            return Err(ClientError::PeerExists(peer_id.clone()));
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let sink = TransportSink::new(peer_id.clone(), generation, self.event_tx.clone());
        let connection = self.transport.create(ice_servers, sink).await?;

        let mut record = PeerRecord::new(peer_id.clone(), generation, role, connection);
        let early = self.early.take(peer_id);
        if !early.is_empty() {
            debug!(
                "Replaying {} early candidates into new record for {:?}",
                early.len(),
                peer_id
            );
            record.pending_candidates.extend(early);
        }

        info!("Created {:?} record for {:?}", role, peer_id);
        Ok(self.records.entry(peer_id.clone()).or_insert(record))
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerRecord> {
        self.records.get(peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut PeerRecord> {
        self.records.get_mut(peer_id)
    }

    /// The record for `peer_id`, only if it is the same one `generation`
    /// was issued to.
    pub fn get_current(&mut self, peer_id: &PeerId, generation: u64) -> Option<&mut PeerRecord> {
        self.records
            .get_mut(peer_id)
            .filter(|record| record.generation == generation)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.records.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &PeerRecord> {
        self.records.values()
    }

    pub fn snapshots(&self) -> Vec<PeerSnapshot> {
        let mut snapshots: Vec<_> = self.records.values().map(PeerRecord::snapshot).collect();
        snapshots.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        snapshots
    }

    /// Close the connection and channel and drop the record. Removing an
    /// absent peer does nothing, and leaves its early candidates in place.
    /// Returns whether a record was removed.
    pub async fn remove(&mut self, peer_id: &PeerId) -> bool {
        let Some(mut record) = self.records.remove(peer_id) else {
            return false;
        };
        record.state = NegotiationState::Closed;

        if let Some(channel) = record.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("Closing channel for {:?}: {}", peer_id, e);
            }
        }
        if let Err(e) = record.connection.close().await {
            warn!("Failed to close connection for {:?}: {}", peer_id, e);
        }

        info!("Removed record for {:?}", peer_id);
        true
    }

    pub async fn remove_all(&mut self) {
        let ids: Vec<PeerId> = self.records.keys().cloned().collect();
        for peer_id in ids {
            self.remove(&peer_id).await;
        }
        self.early.clear();
    }

    /// Hold a candidate for a peer that has no record, including one whose
    /// record was just removed. Nothing is applied until a record for the
    /// peer is created; otherwise the candidate expires with the sweep.
    pub fn buffer_early(
        &mut self,
        peer_id: &PeerId,
        candidate: Candidate,
        now: Instant,
    ) -> EarlyOutcome {
        self.early.push(peer_id, candidate, now)
    }

    pub fn early_count(&self, peer_id: &PeerId) -> usize {
        self.early.count(peer_id)
    }

    /// Expire early candidates older than the ttl.
    pub fn sweep(&mut self, now: Instant) {
        let expired = self.early.sweep(now);
        if expired > 0 {
            info!("Expired early candidates for {} peers", expired);
        }
    }
}
