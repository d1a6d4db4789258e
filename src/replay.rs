//! Experience buffer storing training transitions.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::index;

/// A single training transition.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Observation the action was selected from.
    pub before: Vec<f32>,
    /// Selected action id.
    pub action: usize,
    /// Scalar reward observed after the action.
    pub reward: f64,
    /// Whether this step ended the episode.
    pub done: bool,
    /// Observation after the action (unused by training when `done`).
    pub after: Vec<f32>,
}

/// Fixed-capacity experience buffer with FIFO eviction.
///
/// Once full, each push evicts the oldest transition, so `len()` never
/// exceeds the configured capacity.
#[derive(Debug)]
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Creates an empty buffer holding at most `capacity` transitions.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a transition, evicting the oldest when full.
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest stored transition, if any.
    pub fn oldest(&self) -> Option<&Transition> {
        self.buffer.front()
    }

    /// Samples up to `n` distinct transitions uniformly at random.
    pub fn sample(&self, rng: &mut StdRng, n: usize) -> Vec<&Transition> {
        let amount = n.min(self.buffer.len());
        index::sample(rng, self.buffer.len(), amount)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn transition(marker: f64) -> Transition {
        Transition {
            before: vec![marker as f32],
            action: 0,
            reward: marker,
            done: false,
            after: vec![marker as f32],
        }
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let mut memory = ReplayMemory::new(5);
        for i in 0..20 {
            memory.push(transition(i as f64));
            assert!(memory.len() <= 5);
        }
    }

    #[test]
    fn fifo_eviction_keeps_most_recent() {
        let capacity = 5;
        let extra = 3;
        let mut memory = ReplayMemory::new(capacity);
        for i in 0..(capacity + extra) {
            memory.push(transition(i as f64));
        }
        assert_eq!(memory.len(), capacity);
        // oldest surviving transition is the first not yet evicted
        assert_eq!(memory.oldest().unwrap().reward, extra as f64);
    }

    #[test]
    fn sample_returns_distinct_transitions() {
        let mut memory = ReplayMemory::new(10);
        for i in 0..10 {
            memory.push(transition(i as f64));
        }
        let mut rng = StdRng::seed_from_u64(7);
        let batch = memory.sample(&mut rng, 4);
        assert_eq!(batch.len(), 4);
        let mut rewards: Vec<f64> = batch.iter().map(|t| t.reward).collect();
        rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
        rewards.dedup();
        assert_eq!(rewards.len(), 4);
    }

    #[test]
    fn sample_is_capped_at_len() {
        let mut memory = ReplayMemory::new(10);
        memory.push(transition(1.0));
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(memory.sample(&mut rng, 32).len(), 1);
    }
}
