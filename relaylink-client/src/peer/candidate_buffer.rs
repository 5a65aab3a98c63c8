use relaylink_core::Candidate;
use std::collections::VecDeque;

/// FIFO of remote candidates waiting for the remote description.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    queue: VecDeque<Candidate>,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.queue.push_back(candidate);
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = Candidate>) {
        self.queue.extend(candidates);
    }

    /// Empty the buffer, returning its contents in receipt order.
    pub fn take_all(&mut self) -> Vec<Candidate> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
