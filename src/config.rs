//! Configuration for the control loop, action spaces, and reward models.
//!
//! The on-disk representation is JSON. Variant selection for the action
//! space and reward model uses an internal `type` tag, so an unknown tag
//! fails at parse time rather than silently falling through. Numeric and
//! shape validation happens once, at construction, never mid-loop.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a training session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Number of environment steps before training begins.
    pub train_after: u64,
    /// Settle delay after issuing a command, in seconds.
    pub sleep_time: f64,
    /// Start position used when `use_flag_pos` is false.
    pub init_x: f64,
    pub init_y: f64,
    pub init_z: f64,
    /// Duration of each velocity/yaw command, in seconds.
    pub move_duration: f64,
    /// Take the start pose from the vehicle's spawn flag instead of
    /// the `init_*` coordinates.
    pub use_flag_pos: bool,
    /// Number of training epochs.
    pub epoch_count: u64,
    /// Steps per epoch; total session length is `epoch_count * max_steps_mul`.
    pub max_steps_mul: u64,
    /// Experience buffer capacity.
    pub memory_size: usize,
    /// Hard target-network sync cadence, in steps.
    pub target_update_interval: u64,
    /// Training cadence, in steps.
    pub train_interval: u64,
    /// Steps over which epsilon anneals from its start to its end value.
    pub annealing_steps: u64,
    /// Minibatch size for each training step.
    pub batch_size: usize,
    /// Discount factor for TD targets.
    pub gamma: f64,
    /// Checkpoint persist cadence, in steps (0 disables).
    pub checkpoint_interval: u64,
    /// Action-space variant and parameters.
    pub action_config: ActionSpaceConfig,
    /// Reward-model variant and parameters.
    pub reward_config: RewardConfig,
}

impl RootConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: RootConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Total number of environment steps in the session.
    pub fn max_steps(&self) -> u64 {
        self.epoch_count * self.max_steps_mul
    }

    /// Validates root-level numeric fields.
    ///
    /// Variant-level checks (camera lists, waypoint counts, grid sizes)
    /// live in the action-space and reward-model constructors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "memory_size",
            });
        }
        if self.train_interval == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "train_interval",
            });
        }
        if self.target_update_interval == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "target_update_interval",
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroInterval { field: "batch_size" });
        }
        if self.epoch_count == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "epoch_count",
            });
        }
        if self.max_steps_mul == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "max_steps_mul",
            });
        }
        if self.move_duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration {
                field: "move_duration",
                value: self.move_duration,
            });
        }
        if self.sleep_time < 0.0 {
            return Err(ConfigError::NonPositiveDuration {
                field: "sleep_time",
                value: self.sleep_time,
            });
        }
        Ok(())
    }
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            train_after: 1000,
            sleep_time: 0.1,
            init_x: -0.55265,
            init_y: -31.9786,
            init_z: -19.0225,
            move_duration: 4.0,
            use_flag_pos: true,
            epoch_count: 100,
            max_steps_mul: 10000,
            memory_size: 5000,
            target_update_interval: 50000,
            train_interval: 4,
            annealing_steps: 10000,
            batch_size: 32,
            gamma: 0.99,
            checkpoint_interval: 10000,
            action_config: ActionSpaceConfig::Default(DefaultSpaceConfig::default()),
            reward_config: RewardConfig::Path(PathRewardConfig::default()),
        }
    }
}

/// Action-space variant selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpaceConfig {
    Default(DefaultSpaceConfig),
    Grid(GridSpaceConfig),
}

/// Parameters for [`DefaultActionSpace`](crate::action_space::DefaultActionSpace).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSpaceConfig {
    /// Velocity magnitude of each axis move, in m/s.
    pub scaling_factor: f64,
}

impl Default for DefaultSpaceConfig {
    fn default() -> Self {
        Self {
            scaling_factor: 0.25,
        }
    }
}

/// Parameters for [`GridActionSpace`](crate::action_space::GridActionSpace).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpaceConfig {
    /// Velocity scale applied to every per-axis multiplier, in m/s.
    pub scaling_factor: f64,
    /// Number of evenly spaced multiplier values per axis.
    pub grid_size: u32,
    /// Keep the all-zero (hover) combination in the action set.
    pub include_noop: bool,
}

impl Default for GridSpaceConfig {
    fn default() -> Self {
        Self {
            scaling_factor: 0.25,
            grid_size: 3,
            include_noop: true,
        }
    }
}

/// Reward-model variant selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardConfig {
    Exploration(ExplorationRewardConfig),
    Path(PathRewardConfig),
    Landscape(LandscapeRewardConfig),
}

/// Depth encoding used as the exploration goal signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthGoal {
    #[default]
    Perspective,
    Vis,
    Planner,
}

/// Parameters for [`ExplorationReward`](crate::reward::ExplorationReward).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationRewardConfig {
    pub collision_penalty: f64,
    /// Depth reading at which the reward saturates at 1.
    pub thresh_dist: f64,
    /// Cameras polled for depth readings.
    pub used_cams: Vec<u8>,
    /// Vehicle radius subtracted from depth readings, in meters.
    pub vehicle_rad: f64,
    /// Which depth encoding drives the reward.
    pub goal: DepthGoal,
    /// Altitude ceiling; exceeding it pays `height_penalty`.
    pub max_height: f64,
    pub height_penalty: f64,
}

impl Default for ExplorationRewardConfig {
    fn default() -> Self {
        Self {
            collision_penalty: -1000.0,
            thresh_dist: 7.0,
            used_cams: vec![3],
            vehicle_rad: 0.5,
            goal: DepthGoal::Perspective,
            max_height: 100.0,
            height_penalty: -200.0,
        }
    }
}

/// Parameters for [`PathReward`](crate::reward::PathReward).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRewardConfig {
    pub collision_penalty: f64,
    /// Maximum distance from the path before `large_dist_penalty` applies.
    pub thresh_dist: f64,
    /// Decay rate of the distance reward.
    pub beta: f64,
    /// Reference path waypoints, in order.
    pub points: Vec<[f64; 3]>,
    pub large_dist_penalty: f64,
}

impl Default for PathRewardConfig {
    fn default() -> Self {
        Self {
            collision_penalty: -1000.0,
            thresh_dist: 7.0,
            beta: 1.0,
            points: vec![
                [-0.55265, -31.9786, -19.0225],
                [48.59735, -63.3286, -60.07256],
                [193.5974, -55.0786, -46.32256],
                [369.2474, 35.32137, -62.5725],
                [541.3474, 143.6714, -32.07256],
            ],
            large_dist_penalty: -10.0,
        }
    }
}

/// Parameters for [`LandscapeReward`](crate::reward::LandscapeReward).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeRewardConfig {
    pub collision_penalty: f64,
    /// Flat cost subtracted from each step's displacement reward.
    pub step_cost: f64,
    /// Episode ends when the accumulated reward reaches this value.
    pub done_threshold: f64,
}

impl Default for LandscapeRewardConfig {
    fn default() -> Self {
        Self {
            collision_penalty: -1000.0,
            step_cost: 0.5,
            done_threshold: -100.0,
        }
    }
}
