//! Flight client trait: the simulator collaborator surface.
//!
//! The control loop owns exactly one client and drives it synchronously.
//! Every method is fallible; a [`ClientError`] is fatal to the loop and
//! propagates to the caller (no retry policy lives in this crate).

use crate::error::ClientError;
use crate::types::{CollisionInfo, DrivetrainMode, Pose, Vector3};

/// Image encodings the simulator can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    DepthPerspective,
    DepthVis,
    DepthPlanner,
    Segmentation,
}

/// A single image request for one camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRequest {
    pub camera_id: u8,
    pub kind: ImageKind,
}

impl ImageRequest {
    pub fn new(camera_id: u8, kind: ImageKind) -> Self {
        Self { camera_id, kind }
    }
}

/// A float image buffer returned by the simulator.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    pub width: usize,
    pub height: usize,
    /// Row-major pixel values, `width * height` entries.
    pub data: Vec<f32>,
}

impl DepthFrame {
    /// Creates a frame filled with a single value.
    pub fn uniform(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Maximum pixel value, or negative infinity for an empty frame.
    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Synchronous control surface of a simulated multirotor.
///
/// Implementations are expected to be already connected; transport
/// failures surface as [`ClientError::Transport`].
pub trait FlightClient {
    /// Resets the simulation to its initial state.
    fn reset(&mut self) -> Result<(), ClientError>;

    /// Grants or revokes programmatic control of the vehicle.
    fn enable_api_control(&mut self, enable: bool) -> Result<(), ClientError>;

    /// Arms or disarms the vehicle.
    fn arm(&mut self, arm: bool) -> Result<(), ClientError>;

    /// Teleports the vehicle to a pose.
    fn set_pose(&mut self, pose: &Pose, ignore_collision: bool) -> Result<(), ClientError>;

    /// Current vehicle position.
    fn position(&mut self) -> Result<Vector3, ClientError>;

    /// Current linear velocity.
    fn velocity(&mut self) -> Result<Vector3, ClientError>;

    /// Most recent collision event.
    fn collision_info(&mut self) -> Result<CollisionInfo, ClientError>;

    /// Flies with the given velocity for `duration` seconds.
    fn move_by_velocity(
        &mut self,
        velocity: Vector3,
        duration: f64,
        drivetrain: DrivetrainMode,
    ) -> Result<(), ClientError>;

    /// Rotates in place at `yaw_rate` degrees/second for `duration` seconds.
    fn rotate_by_yaw_rate(&mut self, yaw_rate: f64, duration: f64) -> Result<(), ClientError>;

    /// Renders one frame per request, in request order.
    fn get_images(&mut self, requests: &[ImageRequest]) -> Result<Vec<DepthFrame>, ClientError>;
}
