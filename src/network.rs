//! Neural Q-network using tch-rs (PyTorch bindings).
//!
//! Provides an MLP action-value approximator for the learning agent.
//! This module is only available with the `nn` feature.

use tch::{nn, nn::Module, nn::OptimizerConfig, Device, Kind, Tensor};

use crate::qfunc::{QFunction, QSample};

/// MLP Q-network scoring every action from a flattened observation.
///
/// Architecture: `input_dim → 128 → 64 → num_actions` with ReLU
/// activations; trained with Adam against smooth-L1 (Huber) loss.
pub struct QNetwork {
    vs: nn::VarStore,
    net: nn::Sequential,
    opt: nn::Optimizer,
    input_dim: usize,
    num_actions: usize,
    learning_rate: f64,
    device: Device,
}

impl QNetwork {
    /// Creates a new Q-network.
    pub fn new(input_dim: usize, num_actions: usize, learning_rate: f64, device: Device) -> Self {
        let vs = nn::VarStore::new(device);
        let p = &vs.root();
        let net = nn::seq()
            .add(nn::linear(
                p / "l1",
                input_dim as i64,
                128,
                Default::default(),
            ))
            .add_fn(|x| x.relu())
            .add(nn::linear(p / "l2", 128, 64, Default::default()))
            .add_fn(|x| x.relu())
            .add(nn::linear(
                p / "l3",
                64,
                num_actions as i64,
                Default::default(),
            ));
        let opt = nn::Adam::default()
            .build(&vs, learning_rate)
            .expect("Failed to create optimizer");

        Self {
            vs,
            net,
            opt,
            input_dim,
            num_actions,
            learning_rate,
            device,
        }
    }

    fn forward(&self, observations: &Tensor) -> Tensor {
        self.net.forward(observations)
    }
}

impl Clone for QNetwork {
    /// Builds a network of the same shape and copies the weights over.
    /// The copy gets a fresh optimizer; the agent's target network never
    /// trains, it only serves TD targets until the next sync.
    fn clone(&self) -> Self {
        let mut copy = QNetwork::new(
            self.input_dim,
            self.num_actions,
            self.learning_rate,
            self.device,
        );
        copy.vs.copy(&self.vs).expect("Failed to copy weights");
        copy
    }
}

impl QFunction for QNetwork {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn q_values(&self, observation: &[f32]) -> Vec<f32> {
        let input = Tensor::from_slice(observation)
            .reshape([1, self.input_dim as i64])
            .to_kind(Kind::Float);
        let output = self.forward(&input).squeeze_dim(0);
        output.into()
    }

    fn fit(&mut self, batch: &[QSample<'_>]) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }

        let n = batch.len();
        let flat: Vec<f32> = batch
            .iter()
            .flat_map(|s| s.observation.iter().copied())
            .collect();
        let observations = Tensor::from_slice(&flat)
            .reshape([n as i64, self.input_dim as i64])
            .to_kind(Kind::Float);
        let actions =
            Tensor::from_slice(&batch.iter().map(|s| s.action as i64).collect::<Vec<_>>())
                .to_kind(Kind::Int64);
        let targets = Tensor::from_slice(&batch.iter().map(|s| s.target).collect::<Vec<_>>())
            .to_kind(Kind::Float);

        let predicted = self
            .forward(&observations)
            .gather(-1, &actions.unsqueeze(-1), false)
            .squeeze_dim(-1);
        let loss = predicted.smooth_l1_loss(&targets, tch::Reduction::Mean, 1.0);

        self.opt.zero_grad();
        loss.backward();
        self.opt.step();

        loss.double_value(&[]) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_values_length_matches_actions() {
        let network = QNetwork::new(16, 7, 1e-3, Device::Cpu);
        let q = network.q_values(&vec![0.5; 16]);
        assert_eq!(q.len(), 7);
    }

    #[test]
    fn clone_preserves_outputs() {
        let network = QNetwork::new(16, 4, 1e-3, Device::Cpu);
        let copy = network.clone();
        let observation = vec![0.25; 16];
        let a = network.q_values(&observation);
        let b = copy.q_values(&observation);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn fit_changes_predictions() {
        let mut network = QNetwork::new(8, 3, 1e-2, Device::Cpu);
        let observation = vec![1.0; 8];
        let before = network.q_values(&observation)[1];
        for _ in 0..50 {
            network.fit(&[QSample {
                observation: &observation,
                action: 1,
                target: 5.0,
            }]);
        }
        let after = network.q_values(&observation)[1];
        assert!((after - 5.0).abs() < (before - 5.0).abs());
    }
}
