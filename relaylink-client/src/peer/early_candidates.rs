use crate::config::EarlyCandidateLimits;
use relaylink_core::{Candidate, PeerId};
use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyOutcome {
    Buffered,
    /// Not kept: the per-peer cap was reached.
    Dropped,
}

struct Entry {
    first_seen: Instant,
    candidates: VecDeque<Candidate>,
}

/// Candidates for peers that have no negotiation record yet.
///
/// Entries are replayed into the record once it is created; entries whose
/// peer never shows up expire after the configured ttl.
pub struct EarlyCandidates {
    limits: EarlyCandidateLimits,
    entries: HashMap<PeerId, Entry>,
}

impl EarlyCandidates {
    pub fn new(limits: EarlyCandidateLimits) -> Self {
        Self {
            limits,
            entries: HashMap::new(),
        }
    }

    pub fn push(&mut self, peer_id: &PeerId, candidate: Candidate, now: Instant) -> EarlyOutcome {
        if !self.entries.contains_key(peer_id) && self.entries.len() >= self.limits.max_peers {
            self.evict_oldest();
        }

        let entry = self.entries.entry(peer_id.clone()).or_insert_with(|| Entry {
            first_seen: now,
            candidates: VecDeque::new(),
        });

        if entry.candidates.len() >= self.limits.max_per_peer {
            warn!("Early candidate limit reached for {:?}, dropping", peer_id);
            return EarlyOutcome::Dropped;
        }

        entry.candidates.push_back(candidate);
        EarlyOutcome::Buffered
    }

    /// Remove and return everything buffered for `peer_id`, oldest first.
    pub fn take(&mut self, peer_id: &PeerId) -> Vec<Candidate> {
        self.entries
            .remove(peer_id)
            .map(|entry| Vec::from(entry.candidates))
            .unwrap_or_default()
    }

    pub fn count(&self, peer_id: &PeerId) -> usize {
        self.entries
            .get(peer_id)
            .map_or(0, |entry| entry.candidates.len())
    }

    pub fn peers(&self) -> usize {
        self.entries.len()
    }

    /// Drop entries older than the ttl. Returns how many peers were dropped.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let ttl = self.limits.ttl;
        let before = self.entries.len();
        self.entries.retain(|peer_id, entry| {
            let keep = now.saturating_duration_since(entry.first_seen) < ttl;
            if !keep {
                debug!(
                    "Expiring {} early candidates for {:?}",
                    entry.candidates.len(),
                    peer_id
                );
            }
            keep
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.first_seen)
            .map(|(peer_id, _)| peer_id.clone());
        if let Some(peer_id) = oldest {
            warn!("Too many peers with early candidates, evicting {:?}", peer_id);
            self.entries.remove(&peer_id);
        }
    }
}
