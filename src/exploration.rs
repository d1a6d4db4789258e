//! Exploration policies for epsilon-greedy action selection.

use rand::Rng;

/// Decides, per step, whether the agent should take a random action.
pub trait Explorer: Send + Sync {
    /// Exploration probability at the given training step.
    fn epsilon(&self, step: u64) -> f64;

    /// Rolls the exploration decision for the given training step.
    fn should_explore(&mut self, step: u64) -> bool {
        let epsilon = self.epsilon(step);
        if epsilon <= 0.0 {
            return false;
        }
        rand::thread_rng().gen::<f64>() < epsilon
    }

    /// Human-readable name for this explorer.
    fn name(&self) -> &str;
}

/// Epsilon decays linearly from `start` to `end` over `annealing_steps`,
/// then holds at `end` forever.
pub struct LinearEpsilonAnnealingExplorer {
    start: f64,
    end: f64,
    annealing_steps: u64,
}

impl LinearEpsilonAnnealingExplorer {
    /// Creates an annealing explorer.
    ///
    /// # Arguments
    ///
    /// * `start` - Epsilon at step 0
    /// * `end` - Epsilon held after the annealing horizon
    /// * `annealing_steps` - Steps over which epsilon decays
    pub fn new(start: f64, end: f64, annealing_steps: u64) -> Self {
        Self {
            start,
            end,
            annealing_steps,
        }
    }
}

impl Explorer for LinearEpsilonAnnealingExplorer {
    fn epsilon(&self, step: u64) -> f64 {
        if step >= self.annealing_steps {
            return self.end;
        }
        let progress = step as f64 / self.annealing_steps as f64;
        self.start + (self.end - self.start) * progress
    }

    fn name(&self) -> &str {
        "linear_annealing"
    }
}

/// Fixed exploration probability.
///
/// An epsilon of 0 disables exploration entirely, which makes evaluation
/// runs deterministic given a deterministic value function.
pub struct ConstantExplorer {
    epsilon: f64,
}

impl ConstantExplorer {
    /// Creates a constant explorer with the given epsilon.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Explorer for ConstantExplorer {
    fn epsilon(&self, _step: u64) -> f64 {
        self.epsilon
    }

    fn name(&self) -> &str {
        "constant"
    }
}
