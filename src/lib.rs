//! aeroq - deep Q-learning flight control for simulated multirotors.
//!
//! A synchronous control loop perceives depth imagery, selects discrete
//! motion commands, shapes telemetry into rewards, and trains a DQN-style
//! agent with experience replay and a periodically synced target network.
//!
//! The simulator is an external collaborator behind the
//! [`FlightClient`](client::FlightClient) trait; [`sim::KinematicSim`]
//! provides a synthetic in-crate implementation for tests and demos.
//! The `nn` feature adds a torch-backed value function.

pub mod action_space;
pub mod agent;
pub mod checkpoint;
pub mod client;
pub mod config;
pub mod error;
pub mod exploration;
pub mod observation;
pub mod qfunc;
pub mod replay;
pub mod reward;
pub mod session;
pub mod sim;
pub mod types;

#[cfg(feature = "nn")]
pub mod network;

pub use action_space::{ActionSpace, DefaultActionSpace, GridActionSpace};
pub use agent::DeepQAgent;
pub use checkpoint::{CheckpointSink, JsonCheckpoint, NoopCheckpoint};
pub use client::{DepthFrame, FlightClient, ImageKind, ImageRequest};
pub use config::{ActionSpaceConfig, RewardConfig, RootConfig};
pub use error::{ActionError, ClientError, ConfigError, SessionError};
pub use exploration::{ConstantExplorer, Explorer, LinearEpsilonAnnealingExplorer};
pub use observation::{Frame, FrameStack};
pub use qfunc::{LinearQFunction, QFunction};
pub use replay::{ReplayMemory, Transition};
pub use reward::{ExplorationReward, LandscapeReward, PathReward, RewardModel};
pub use session::{FlightSession, SessionOptions, SessionSummary};
pub use sim::KinematicSim;
pub use types::{ControlCommand, DrivetrainMode, Pose, StepSnapshot, Vector3};

#[cfg(feature = "nn")]
pub use network::QNetwork;
