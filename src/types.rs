//! Core geometric and telemetry types shared across the crate.
//!
//! Positions and velocities use the simulator's NED world frame
//! (z grows downward), matching the collaborator's conventions.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A 3D vector in the simulator world frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Creates a new vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Norm of the horizontal (x, y) components only.
    pub fn horizontal_norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Cross product `self × other`.
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Returns this vector scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Vector3 {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Vector3::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// A vehicle pose: position plus Euler orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl Pose {
    /// Creates a level pose at `position` (zero pitch/roll/yaw).
    pub fn level_at(position: Vector3) -> Self {
        Self {
            position,
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }
}

/// Collision event reported by the simulator.
#[derive(Debug, Clone, Default)]
pub struct CollisionInfo {
    /// Whether the vehicle is currently in collision.
    pub has_collided: bool,
    /// Name of the object hit, when the simulator reports one.
    pub object_name: String,
    /// Penetration depth of the collision, in meters.
    pub penetration_depth: f64,
}

impl CollisionInfo {
    /// A collision event against the named object.
    pub fn collided(object_name: impl Into<String>) -> Self {
        Self {
            has_collided: true,
            object_name: object_name.into(),
            penetration_depth: 0.0,
        }
    }
}

/// Control convention for velocity commands.
///
/// `ForwardOnly` locks yaw to the velocity heading; `MaxDegreeOfFreedom`
/// leaves yaw free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivetrainMode {
    MaxDegreeOfFreedom,
    ForwardOnly,
}

/// A discrete action interpreted into a continuous command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Fly with the given velocity vector for the move duration.
    Velocity(Vector3),
    /// Rotate in place at the given yaw rate (degrees per second).
    YawRate(f64),
}

/// Immutable telemetry snapshot taken once per control step.
///
/// `prev_position` is the position read before the step's command was
/// issued; only path-relative reward models consume it.
#[derive(Debug, Clone)]
pub struct StepSnapshot {
    pub position: Vector3,
    pub prev_position: Vector3,
    pub velocity: Vector3,
    pub collision: CollisionInfo,
}
