//! The deep Q-learning agent: action selection, experience ingestion,
//! and periodic training against a delayed target network.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::checkpoint::{CheckpointSink, NoopCheckpoint};
use crate::config::RootConfig;
use crate::exploration::Explorer;
use crate::qfunc::{QFunction, QSample};
use crate::replay::{ReplayMemory, Transition};

/// An observation paired with the action taken from it, waiting for the
/// next observation to complete its transition.
struct PendingStep {
    observation: Vec<f32>,
    action: usize,
    reward: f64,
}

/// Epsilon-greedy Q-learning agent with experience replay and a hard
/// target-network sync.
///
/// The agent owns the experience buffer and the training step counter;
/// both are mutated only through [`DeepQAgent::observe`] and
/// [`DeepQAgent::train`], which the control loop calls strictly
/// sequentially.
pub struct DeepQAgent<Q: QFunction> {
    policy: Q,
    target: Q,
    explorer: Box<dyn Explorer>,
    memory: ReplayMemory,
    pending: Option<PendingStep>,
    step: u64,
    train_after: u64,
    train_interval: u64,
    target_update_interval: u64,
    checkpoint_interval: u64,
    batch_size: usize,
    gamma: f64,
    checkpoint: Box<dyn CheckpointSink>,
    rng: StdRng,
    last_loss: Option<f32>,
}

impl<Q: QFunction> DeepQAgent<Q> {
    /// Creates an agent around a value-function approximator.
    ///
    /// The target network starts as a copy of the policy network. The
    /// seed makes random action draws reproducible; exploration
    /// decisions themselves come from the explorer.
    pub fn new(policy: Q, explorer: Box<dyn Explorer>, config: &RootConfig, seed: u64) -> Self {
        let target = policy.clone();
        Self {
            policy,
            target,
            explorer,
            memory: ReplayMemory::new(config.memory_size),
            pending: None,
            step: 0,
            train_after: config.train_after,
            train_interval: config.train_interval,
            target_update_interval: config.target_update_interval,
            checkpoint_interval: config.checkpoint_interval,
            batch_size: config.batch_size,
            gamma: config.gamma,
            checkpoint: Box::new(NoopCheckpoint),
            rng: StdRng::seed_from_u64(seed),
            last_loss: None,
        }
    }

    /// Routes periodic parameter snapshots to the given sink.
    pub fn set_checkpoint(&mut self, sink: Box<dyn CheckpointSink>) {
        self.checkpoint = sink;
    }

    /// Selects an action for the observation.
    ///
    /// Explores (uniform random action) when the explorer says so at the
    /// current training step; otherwise exploits the argmax of the
    /// policy network's action values.
    pub fn act(&mut self, observation: &[f32]) -> usize {
        if self.explorer.should_explore(self.step) {
            let action = self.rng.gen_range(0..self.policy.num_actions());
            debug!(step = self.step, action, "exploring");
            return action;
        }
        let q = self.policy.q_values(observation);
        argmax(&q)
    }

    /// Records the outcome of one environment step.
    ///
    /// A transition is completed lazily: this call's observation becomes
    /// the after-state of the previous call's pending step. Terminal
    /// steps complete immediately; their after-state is never read by
    /// training because the done mask zeroes the bootstrap term.
    /// Advances the training step counter by one.
    pub fn observe(&mut self, observation: &[f32], action: usize, reward: f64, done: bool) {
        if let Some(pending) = self.pending.take() {
            self.memory.push(Transition {
                before: pending.observation,
                action: pending.action,
                reward: pending.reward,
                done: false,
                after: observation.to_vec(),
            });
        }

        if done {
            self.memory.push(Transition {
                before: observation.to_vec(),
                action,
                reward,
                done: true,
                after: observation.to_vec(),
            });
        } else {
            self.pending = Some(PendingStep {
                observation: observation.to_vec(),
                action,
                reward,
            });
        }

        self.step += 1;
    }

    /// Runs one training round if the cadences allow it.
    ///
    /// No-op until the step counter passes the warm-up threshold. After
    /// that, every `train_interval` steps a minibatch is fit against TD
    /// targets from the delayed target network, and every
    /// `target_update_interval` steps the target network is replaced by
    /// a full copy of the policy network.
    ///
    /// Returns the minibatch loss when a fit ran.
    pub fn train(&mut self) -> Option<f32> {
        if self.step < self.train_after {
            return None;
        }

        let mut loss = None;
        if self.step % self.train_interval == 0 && self.memory.len() >= self.batch_size {
            loss = Some(self.train_minibatch());
            self.last_loss = loss;
        }

        if self.step % self.target_update_interval == 0 {
            self.target = self.policy.clone();
            info!(step = self.step, "target network synchronized");
        }

        if self.checkpoint_interval > 0 && self.step % self.checkpoint_interval == 0 {
            let snapshot = self.policy.snapshot();
            if let Err(err) = self.checkpoint.persist(self.step, &snapshot) {
                // persistence is best-effort; training goes on
                tracing::warn!(step = self.step, error = %err, "checkpoint persist failed");
            }
        }

        loss
    }

    fn train_minibatch(&mut self) -> f32 {
        let batch = self.memory.sample(&mut self.rng, self.batch_size);

        let targets: Vec<f32> = batch
            .iter()
            .map(|t| {
                let bootstrap = if t.done {
                    0.0
                } else {
                    let next_q = self.target.q_values(&t.after);
                    self.gamma * f64::from(max_value(&next_q))
                };
                (t.reward + bootstrap) as f32
            })
            .collect();

        let samples: Vec<QSample<'_>> = batch
            .iter()
            .zip(&targets)
            .map(|(t, &target)| QSample {
                observation: &t.before,
                action: t.action,
                target,
            })
            .collect();

        self.policy.fit(&samples)
    }

    /// Current training step count.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of buffered transitions.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Loss of the most recent minibatch fit, if any ran.
    pub fn last_loss(&self) -> Option<f32> {
        self.last_loss
    }

    /// The policy approximator (for snapshots and evaluation).
    pub fn policy(&self) -> &Q {
        &self.policy
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn max_value(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}
