//! Synthetic kinematic flight client.
//!
//! A box-world stand-in for the real simulator: velocity commands
//! integrate directly into position, depth cameras report the distance
//! to the nearest wall, and leaving the box registers a collision. It
//! exists to drive the full control loop in tests and the demo harness,
//! not to model flight dynamics.

use crate::client::{DepthFrame, FlightClient, ImageKind, ImageRequest};
use crate::error::ClientError;
use crate::types::{CollisionInfo, DrivetrainMode, Pose, Vector3};

const SIM_FRAME_WIDTH: usize = 32;
const SIM_FRAME_HEIGHT: usize = 32;

/// Kinematic flight client confined to a cubic world.
///
/// The world is the axis-aligned cube `[-half_extent, half_extent]^3`
/// centered on the origin. Commands are rejected unless the vehicle has
/// been armed and API control enabled, mirroring the real collaborator's
/// preconditions.
#[derive(Debug)]
pub struct KinematicSim {
    half_extent: f64,
    position: Vector3,
    velocity: Vector3,
    yaw: f64,
    api_control: bool,
    armed: bool,
    collided: bool,
}

impl KinematicSim {
    /// Creates a simulator with the given world half-extent, in meters.
    pub fn new(half_extent: f64) -> Self {
        Self {
            half_extent,
            position: Vector3::zero(),
            velocity: Vector3::zero(),
            yaw: 0.0,
            api_control: false,
            armed: false,
            collided: false,
        }
    }

    /// Current yaw angle, in degrees.
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Distance from the current position to the nearest wall.
    fn wall_distance(&self) -> f64 {
        let h = self.half_extent;
        [
            h - self.position.x,
            h + self.position.x,
            h - self.position.y,
            h + self.position.y,
            h - self.position.z,
            h + self.position.z,
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
        .max(0.0)
    }

    fn check_flyable(&self) -> Result<(), ClientError> {
        if !self.api_control {
            return Err(ClientError::Rejected("api control is disabled".into()));
        }
        if !self.armed {
            return Err(ClientError::Rejected("vehicle is not armed".into()));
        }
        Ok(())
    }

    fn clamp_to_world(&mut self) {
        let h = self.half_extent;
        let clamped = Vector3::new(
            self.position.x.clamp(-h, h),
            self.position.y.clamp(-h, h),
            self.position.z.clamp(-h, h),
        );
        if clamped != self.position {
            self.collided = true;
            self.position = clamped;
        }
    }
}

impl FlightClient for KinematicSim {
    fn reset(&mut self) -> Result<(), ClientError> {
        self.position = Vector3::zero();
        self.velocity = Vector3::zero();
        self.yaw = 0.0;
        self.api_control = false;
        self.armed = false;
        self.collided = false;
        Ok(())
    }

    fn enable_api_control(&mut self, enable: bool) -> Result<(), ClientError> {
        self.api_control = enable;
        Ok(())
    }

    fn arm(&mut self, arm: bool) -> Result<(), ClientError> {
        self.armed = arm;
        Ok(())
    }

    fn set_pose(&mut self, pose: &Pose, _ignore_collision: bool) -> Result<(), ClientError> {
        self.position = pose.position;
        self.yaw = pose.yaw;
        self.velocity = Vector3::zero();
        self.collided = false;
        Ok(())
    }

    fn position(&mut self) -> Result<Vector3, ClientError> {
        Ok(self.position)
    }

    fn velocity(&mut self) -> Result<Vector3, ClientError> {
        Ok(self.velocity)
    }

    fn collision_info(&mut self) -> Result<CollisionInfo, ClientError> {
        Ok(if self.collided {
            CollisionInfo::collided("world_boundary")
        } else {
            CollisionInfo::default()
        })
    }

    fn move_by_velocity(
        &mut self,
        velocity: Vector3,
        duration: f64,
        _drivetrain: DrivetrainMode,
    ) -> Result<(), ClientError> {
        self.check_flyable()?;
        self.velocity = velocity;
        self.position = self.position + velocity.scaled(duration);
        self.clamp_to_world();
        Ok(())
    }

    fn rotate_by_yaw_rate(&mut self, yaw_rate: f64, duration: f64) -> Result<(), ClientError> {
        self.check_flyable()?;
        self.velocity = Vector3::zero();
        self.yaw += yaw_rate * duration;
        Ok(())
    }

    fn get_images(&mut self, requests: &[ImageRequest]) -> Result<Vec<DepthFrame>, ClientError> {
        let distance = self.wall_distance() as f32;
        Ok(requests
            .iter()
            .map(|request| {
                // encodings differ only by a fixed attenuation here
                let value = match request.kind {
                    ImageKind::DepthPerspective => distance,
                    ImageKind::DepthVis => distance * 0.95,
                    ImageKind::DepthPlanner => distance * 0.9,
                    ImageKind::Segmentation => 0.0,
                };
                DepthFrame::uniform(SIM_FRAME_WIDTH, SIM_FRAME_HEIGHT, value)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed_sim(half_extent: f64) -> KinematicSim {
        let mut sim = KinematicSim::new(half_extent);
        sim.enable_api_control(true).unwrap();
        sim.arm(true).unwrap();
        sim
    }

    #[test]
    fn move_rejected_until_armed() {
        let mut sim = KinematicSim::new(10.0);
        let err = sim
            .move_by_velocity(Vector3::new(1.0, 0.0, 0.0), 1.0, DrivetrainMode::MaxDegreeOfFreedom)
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected(_)));
    }

    #[test]
    fn velocity_integrates_into_position() {
        let mut sim = armed_sim(10.0);
        sim.move_by_velocity(
            Vector3::new(2.0, 0.0, -1.0),
            2.0,
            DrivetrainMode::MaxDegreeOfFreedom,
        )
        .unwrap();
        let position = sim.position().unwrap();
        assert!((position.x - 4.0).abs() < 1e-12);
        assert!((position.z + 2.0).abs() < 1e-12);
    }

    #[test]
    fn leaving_the_world_collides() {
        let mut sim = armed_sim(1.0);
        sim.move_by_velocity(
            Vector3::new(5.0, 0.0, 0.0),
            1.0,
            DrivetrainMode::MaxDegreeOfFreedom,
        )
        .unwrap();
        assert!(sim.collision_info().unwrap().has_collided);
        // clamped to the wall
        assert!((sim.position().unwrap().x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reset_clears_collision_and_pose() {
        let mut sim = armed_sim(1.0);
        sim.move_by_velocity(
            Vector3::new(5.0, 0.0, 0.0),
            1.0,
            DrivetrainMode::MaxDegreeOfFreedom,
        )
        .unwrap();
        sim.reset().unwrap();
        assert!(!sim.collision_info().unwrap().has_collided);
        assert_eq!(sim.position().unwrap(), Vector3::zero());
    }

    #[test]
    fn depth_reflects_distance_to_wall() {
        let mut sim = armed_sim(10.0);
        let frames = sim
            .get_images(&[ImageRequest::new(3, ImageKind::DepthPerspective)])
            .unwrap();
        assert_eq!(frames.len(), 1);
        // centered vehicle sees the half-extent in every direction
        assert!((frames[0].max_value() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn yaw_rate_integrates() {
        let mut sim = armed_sim(10.0);
        sim.rotate_by_yaw_rate(30.0, 2.0).unwrap();
        assert!((sim.yaw() - 60.0).abs() < 1e-12);
        // rotating in place stops translation
        assert_eq!(sim.velocity().unwrap(), Vector3::zero());
    }

    #[test]
    fn set_pose_teleports() {
        let mut sim = armed_sim(10.0);
        let pose = Pose::level_at(Vector3::new(1.0, 2.0, 3.0));
        sim.set_pose(&pose, true).unwrap();
        assert_eq!(sim.position().unwrap(), Vector3::new(1.0, 2.0, 3.0));
    }
}
