//! Error taxonomy for the flight-control crate.
//!
//! `ConfigError` is raised at construction time and is never retried;
//! `ActionError` indicates an agent/action-space mismatch; `ClientError`
//! wraps failures of the simulator collaborator and terminates the loop.

use thiserror::Error;

/// Invalid or degenerate configuration, detected at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{space} action space: scaling factor must be positive, got {factor}")]
    NonPositiveScaling { space: &'static str, factor: f64 },

    #[error("grid action space: grid size must be at least 1")]
    ZeroGridSize,

    #[error("exploration reward: camera list is empty")]
    EmptyCameraList,

    #[error(
        "exploration reward: threshold distance {thresh_dist} must exceed \
         vehicle radius {vehicle_rad}"
    )]
    DegenerateDepthRange { thresh_dist: f64, vehicle_rad: f64 },

    #[error("path reward: a reference path needs at least 2 waypoints, got {0}")]
    DegeneratePath(usize),

    #[error("root config: {field} must be at least 1")]
    ZeroInterval { field: &'static str },

    #[error("root config: {field} must be positive, got {value}")]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error(
        "checkpoint: value function scores {actual} actions but the \
         action space has {expected}"
    )]
    CheckpointMismatch { expected: usize, actual: usize },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An action id outside the valid range of the action space.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("{space} action space: action id {action} out of range (num_actions = {num_actions})")]
    OutOfRange {
        space: &'static str,
        action: usize,
        num_actions: usize,
    },
}

/// Failure of the simulator collaborator.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("simulator transport failure: {0}")]
    Transport(String),

    #[error("simulator rejected command: {0}")]
    Rejected(String),

    #[error("image request returned no frames")]
    EmptyImageResponse,
}

/// Top-level error for a flight session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
