//! Discrete action spaces mapping action ids to control commands.

use crate::config::{ActionSpaceConfig, DefaultSpaceConfig, GridSpaceConfig};
use crate::error::{ActionError, ConfigError};
use crate::types::{ControlCommand, Vector3};

/// Maps an integer action id to a continuous control command.
pub trait ActionSpace: Send + Sync {
    /// Number of valid action ids.
    fn num_actions(&self) -> usize;

    /// Interprets an action id into a command.
    ///
    /// Fails with [`ActionError::OutOfRange`] for ids outside
    /// `[0, num_actions())` — that indicates an agent/action-space
    /// mismatch, not a recoverable condition.
    fn interpret(&self, action: usize) -> Result<ControlCommand, ActionError>;

    /// Human-readable name for this action space.
    fn name(&self) -> &'static str;
}

/// Builds the action space declared by the configuration.
pub fn build(config: &ActionSpaceConfig) -> Result<Box<dyn ActionSpace>, ConfigError> {
    match config {
        ActionSpaceConfig::Default(c) => Ok(Box::new(DefaultActionSpace::new(c)?)),
        ActionSpaceConfig::Grid(c) => Ok(Box::new(GridActionSpace::new(c)?)),
    }
}

/// The fixed seven-action space: hover plus the six axis-aligned moves.
///
/// Action 0 is the no-op hover; actions 1..=6 are unit moves along
/// ±x, ±y, ±z scaled by the configured factor.
#[derive(Debug)]
pub struct DefaultActionSpace {
    offsets: Vec<Vector3>,
}

impl DefaultActionSpace {
    pub fn new(config: &DefaultSpaceConfig) -> Result<Self, ConfigError> {
        let scale = config.scaling_factor;
        if scale <= 0.0 {
            return Err(ConfigError::NonPositiveScaling {
                space: "default",
                factor: scale,
            });
        }
        let offsets = vec![
            Vector3::zero(),
            Vector3::new(scale, 0.0, 0.0),
            Vector3::new(-scale, 0.0, 0.0),
            Vector3::new(0.0, scale, 0.0),
            Vector3::new(0.0, -scale, 0.0),
            Vector3::new(0.0, 0.0, scale),
            Vector3::new(0.0, 0.0, -scale),
        ];
        Ok(Self { offsets })
    }
}

impl ActionSpace for DefaultActionSpace {
    fn num_actions(&self) -> usize {
        self.offsets.len()
    }

    fn interpret(&self, action: usize) -> Result<ControlCommand, ActionError> {
        match self.offsets.get(action) {
            Some(offset) => Ok(ControlCommand::Velocity(*offset)),
            None => Err(ActionError::OutOfRange {
                space: "default",
                action,
                num_actions: self.num_actions(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "default"
    }
}

/// Combinatorial per-axis action grid.
///
/// Each axis takes one of `grid_size` evenly spaced multipliers centered
/// on zero (`grid_size == 3` gives {-1, 0, 1}); an action is one
/// `(mx, my, mz)` combination scaled by the configured factor. The
/// all-zero combination is kept or dropped per `include_noop`.
pub struct GridActionSpace {
    offsets: Vec<Vector3>,
}

impl GridActionSpace {
    pub fn new(config: &GridSpaceConfig) -> Result<Self, ConfigError> {
        let scale = config.scaling_factor;
        if scale <= 0.0 {
            return Err(ConfigError::NonPositiveScaling {
                space: "grid",
                factor: scale,
            });
        }
        if config.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }

        let size = config.grid_size as usize;
        let center = (size as f64 - 1.0) / 2.0;
        let multipliers: Vec<f64> = (0..size).map(|i| i as f64 - center).collect();

        let mut offsets = Vec::with_capacity(size * size * size);
        for &mx in &multipliers {
            for &my in &multipliers {
                for &mz in &multipliers {
                    if !config.include_noop && mx == 0.0 && my == 0.0 && mz == 0.0 {
                        continue;
                    }
                    offsets.push(Vector3::new(mx * scale, my * scale, mz * scale));
                }
            }
        }
        Ok(Self { offsets })
    }
}

impl ActionSpace for GridActionSpace {
    fn num_actions(&self) -> usize {
        self.offsets.len()
    }

    fn interpret(&self, action: usize) -> Result<ControlCommand, ActionError> {
        match self.offsets.get(action) {
            Some(offset) => Ok(ControlCommand::Velocity(*offset)),
            None => Err(ActionError::OutOfRange {
                space: "grid",
                action,
                num_actions: self.num_actions(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}
