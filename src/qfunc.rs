//! Action-value function seam and the built-in linear approximator.
//!
//! The learning agent treats its value function as opaque: anything that
//! can score actions and fit toward TD targets plugs in here. The linear
//! model below keeps the default build dependency-free; the `nn` feature
//! adds a torch-backed MLP (see [`crate::network`]).

use serde::{Deserialize, Serialize};

/// One supervised sample for a fit step: push the predicted value of
/// `action` at `observation` toward `target`.
#[derive(Debug, Clone, Copy)]
pub struct QSample<'a> {
    pub observation: &'a [f32],
    pub action: usize,
    pub target: f32,
}

/// An action-value approximator.
///
/// `Clone` supports the agent's hard target-network sync: the target is
/// a full copy of the policy approximator, refreshed on a fixed cadence.
pub trait QFunction: Clone {
    /// Expected observation length.
    fn input_dim(&self) -> usize;

    /// Number of actions scored.
    fn num_actions(&self) -> usize;

    /// Action-value estimates for one observation.
    fn q_values(&self, observation: &[f32]) -> Vec<f32>;

    /// One optimization step over a minibatch; returns the mean loss.
    fn fit(&mut self, batch: &[QSample<'_>]) -> f32;

    /// Serializable parameter snapshot for checkpointing.
    ///
    /// Approximators whose parameters live outside the process (or are
    /// persisted through their own mechanism) may return `Null`.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Huber loss with unit delta.
pub(crate) fn huber(error: f32) -> f32 {
    if error.abs() <= 1.0 {
        0.5 * error * error
    } else {
        error.abs() - 0.5
    }
}

/// Per-action linear action-value model trained by Huber-gradient SGD.
///
/// Deliberately simple: one weight vector and bias per action over the
/// flattened observation. It learns enough structure to exercise the
/// full training loop and serializes cleanly for checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearQFunction {
    input_dim: usize,
    num_actions: usize,
    learning_rate: f32,
    weights: Vec<Vec<f32>>,
    biases: Vec<f32>,
}

impl LinearQFunction {
    /// Creates a zero-initialized model.
    pub fn new(input_dim: usize, num_actions: usize, learning_rate: f32) -> Self {
        Self {
            input_dim,
            num_actions,
            learning_rate,
            weights: vec![vec![0.0; input_dim]; num_actions],
            biases: vec![0.0; num_actions],
        }
    }

    fn q_value(&self, observation: &[f32], action: usize) -> f32 {
        let dot: f32 = self.weights[action]
            .iter()
            .zip(observation)
            .map(|(w, x)| w * x)
            .sum();
        dot + self.biases[action]
    }
}

impl QFunction for LinearQFunction {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn q_values(&self, observation: &[f32]) -> Vec<f32> {
        (0..self.num_actions)
            .map(|action| self.q_value(observation, action))
            .collect()
    }

    fn fit(&mut self, batch: &[QSample<'_>]) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }

        let mut total_loss = 0.0;
        for sample in batch {
            let predicted = self.q_value(sample.observation, sample.action);
            let error = predicted - sample.target;
            total_loss += huber(error);

            // Huber gradient: the error clipped to [-1, 1]
            let gradient = error.clamp(-1.0, 1.0);
            let step = self.learning_rate * gradient;
            for (weight, &x) in self.weights[sample.action].iter_mut().zip(sample.observation) {
                *weight -= step * x;
            }
            self.biases[sample.action] -= step;
        }
        total_loss / batch.len() as f32
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
