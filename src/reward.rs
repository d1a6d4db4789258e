//! Reward models shaping telemetry into a scalar training signal.
//!
//! Each model consumes the per-step telemetry snapshot and decides both
//! the reward and the episode-done condition. The exploration model also
//! polls depth cameras through the control loop's client handle.

use tracing::debug;

use crate::client::{FlightClient, ImageKind, ImageRequest};
use crate::config::{
    DepthGoal, ExplorationRewardConfig, LandscapeRewardConfig, PathRewardConfig, RewardConfig,
};
use crate::error::{ClientError, ConfigError};
use crate::types::{StepSnapshot, Vector3};

/// Turns telemetry into a scalar reward and an episode-done verdict.
pub trait RewardModel: Send {
    /// Computes the reward for one step.
    ///
    /// The client handle is provided by the control loop for models that
    /// read cameras; models that don't need it ignore it.
    fn compute_reward(
        &self,
        snapshot: &StepSnapshot,
        client: &mut dyn FlightClient,
    ) -> Result<f64, ClientError>;

    /// Decides whether the episode is over.
    ///
    /// Receives the instantaneous reward, or the accumulated episode
    /// reward when [`RewardModel::tracks_cumulative`] is true.
    fn is_done(&self, reward: f64) -> bool;

    /// Whether the done decision is driven by the accumulated episode
    /// reward rather than the instantaneous one.
    fn tracks_cumulative(&self) -> bool {
        false
    }

    /// Human-readable name for this reward model.
    fn name(&self) -> &'static str;
}

/// Builds the reward model declared by the configuration.
pub fn build(config: &RewardConfig) -> Result<Box<dyn RewardModel>, ConfigError> {
    match config {
        RewardConfig::Exploration(c) => Ok(Box::new(ExplorationReward::new(c)?)),
        RewardConfig::Path(c) => Ok(Box::new(PathReward::new(c)?)),
        RewardConfig::Landscape(c) => Ok(Box::new(LandscapeReward::new(c))),
    }
}

/// Rewards flying toward open space.
///
/// Collision pays the collision penalty and exceeding the altitude
/// ceiling pays the height penalty. Otherwise the model polls every
/// configured camera for the three depth encodings, takes the maximum
/// reading per encoding across cameras, selects one encoding as the goal
/// signal, and normalizes it against the vehicle radius and threshold
/// distance. The result is clamped above at 1; readings below the
/// vehicle radius go negative, signaling proximity to an obstacle.
pub struct ExplorationReward {
    collision_penalty: f64,
    height_penalty: f64,
    used_cams: Vec<u8>,
    vehicle_rad: f64,
    thresh_dist: f64,
    goal: DepthGoal,
    max_height: f64,
}

impl ExplorationReward {
    pub fn new(config: &ExplorationRewardConfig) -> Result<Self, ConfigError> {
        if config.used_cams.is_empty() {
            return Err(ConfigError::EmptyCameraList);
        }
        if config.thresh_dist <= config.vehicle_rad {
            return Err(ConfigError::DegenerateDepthRange {
                thresh_dist: config.thresh_dist,
                vehicle_rad: config.vehicle_rad,
            });
        }
        Ok(Self {
            collision_penalty: config.collision_penalty,
            height_penalty: config.height_penalty,
            used_cams: config.used_cams.clone(),
            vehicle_rad: config.vehicle_rad,
            thresh_dist: config.thresh_dist,
            goal: config.goal,
            max_height: config.max_height,
        })
    }

    /// Maximum reading per depth encoding across all configured cameras.
    fn max_depths(&self, client: &mut dyn FlightClient) -> Result<[f64; 3], ClientError> {
        let mut maxima = [f64::NEG_INFINITY; 3];
        for &camera_id in &self.used_cams {
            let requests = [
                ImageRequest::new(camera_id, ImageKind::DepthPerspective),
                ImageRequest::new(camera_id, ImageKind::DepthVis),
                ImageRequest::new(camera_id, ImageKind::DepthPlanner),
            ];
            let responses = client.get_images(&requests)?;
            if responses.len() < requests.len() {
                return Err(ClientError::EmptyImageResponse);
            }
            for (maximum, response) in maxima.iter_mut().zip(&responses) {
                *maximum = maximum.max(response.max_value() as f64);
            }
        }
        Ok(maxima)
    }
}

impl RewardModel for ExplorationReward {
    fn compute_reward(
        &self,
        snapshot: &StepSnapshot,
        client: &mut dyn FlightClient,
    ) -> Result<f64, ClientError> {
        if snapshot.collision.has_collided {
            return Ok(self.collision_penalty);
        }
        if snapshot.position.z > self.max_height {
            return Ok(self.height_penalty);
        }

        let goals = self.max_depths(client)?;
        let depth = match self.goal {
            DepthGoal::Perspective => goals[0],
            DepthGoal::Vis => goals[1],
            DepthGoal::Planner => goals[2],
        };
        debug!(
            perspective = goals[0],
            vis = goals[1],
            planner = goals[2],
            "exploration depth goals"
        );

        let reward = (depth - self.vehicle_rad) / (self.thresh_dist - self.vehicle_rad);
        Ok(reward.min(1.0))
    }

    fn is_done(&self, reward: f64) -> bool {
        // any penalty-level signal ends the episode; the collision
        // penalty sits below the height penalty
        reward <= self.height_penalty
    }

    fn name(&self) -> &'static str {
        "exploration"
    }
}

/// Rewards staying close to a reference path while making progress.
///
/// Distance to the path is the minimum over consecutive waypoint pairs of
/// the infinite-line distance `|cross(p-a, p-b)| / |b-a|`. Positions past
/// a segment's endpoints still measure against the segment's infinite
/// extension; that is the intended shaping, not an approximation to fix.
/// Zero-length segments are skipped in the scan.
pub struct PathReward {
    points: Vec<Vector3>,
    thresh_dist: f64,
    beta: f64,
    collision_penalty: f64,
    large_dist_penalty: f64,
}

impl PathReward {
    pub fn new(config: &PathRewardConfig) -> Result<Self, ConfigError> {
        if config.points.len() < 2 {
            return Err(ConfigError::DegeneratePath(config.points.len()));
        }
        Ok(Self {
            points: config.points.iter().map(|&p| Vector3::from(p)).collect(),
            thresh_dist: config.thresh_dist,
            beta: config.beta,
            collision_penalty: config.collision_penalty,
            large_dist_penalty: config.large_dist_penalty,
        })
    }

    /// Minimum infinite-line distance from `position` to the path.
    fn distance_to_path(&self, position: Vector3) -> f64 {
        let mut dist = f64::INFINITY;
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let segment_len = (b - a).norm();
            if segment_len == 0.0 {
                continue;
            }
            let cross = (position - a).cross(&(position - b));
            dist = dist.min(cross.norm() / segment_len);
        }
        dist
    }
}

impl RewardModel for PathReward {
    fn compute_reward(
        &self,
        snapshot: &StepSnapshot,
        _client: &mut dyn FlightClient,
    ) -> Result<f64, ClientError> {
        if snapshot.collision.has_collided {
            return Ok(self.collision_penalty);
        }

        let dist = self.distance_to_path(snapshot.position);
        if dist > self.thresh_dist {
            return Ok(self.large_dist_penalty);
        }

        let reward_dist = (-self.beta * dist).exp() - 0.5;
        let reward_speed = snapshot.velocity.norm() - 0.5;
        Ok(reward_dist + reward_speed)
    }

    fn is_done(&self, reward: f64) -> bool {
        reward <= self.large_dist_penalty
    }

    fn name(&self) -> &'static str {
        "path"
    }
}

/// Rewards covering ground, judged on the accumulated episode reward.
///
/// Each step pays the horizontal displacement since the previous
/// snapshot minus a flat step cost; collisions pay the collision
/// penalty. The episode ends when the accumulated reward falls to the
/// configured threshold, so sustained lack of progress terminates.
pub struct LandscapeReward {
    collision_penalty: f64,
    step_cost: f64,
    done_threshold: f64,
}

impl LandscapeReward {
    pub fn new(config: &LandscapeRewardConfig) -> Self {
        Self {
            collision_penalty: config.collision_penalty,
            step_cost: config.step_cost,
            done_threshold: config.done_threshold,
        }
    }
}

impl RewardModel for LandscapeReward {
    fn compute_reward(
        &self,
        snapshot: &StepSnapshot,
        _client: &mut dyn FlightClient,
    ) -> Result<f64, ClientError> {
        if snapshot.collision.has_collided {
            return Ok(self.collision_penalty);
        }
        let displacement = (snapshot.position - snapshot.prev_position).horizontal_norm();
        Ok(displacement - self.step_cost)
    }

    fn is_done(&self, cumulative_reward: f64) -> bool {
        cumulative_reward <= self.done_threshold
    }

    fn tracks_cumulative(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "landscape"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DepthFrame;
    use crate::error::ClientError;
    use crate::types::{CollisionInfo, DrivetrainMode, Pose};

    /// Client stub returning canned depth readings.
    struct FixedDepthClient {
        perspective: f32,
        vis: f32,
        planner: f32,
    }

    impl FlightClient for FixedDepthClient {
        fn reset(&mut self) -> Result<(), ClientError> {
            Ok(())
        }
        fn enable_api_control(&mut self, _enable: bool) -> Result<(), ClientError> {
            Ok(())
        }
        fn arm(&mut self, _arm: bool) -> Result<(), ClientError> {
            Ok(())
        }
        fn set_pose(&mut self, _pose: &Pose, _ignore: bool) -> Result<(), ClientError> {
            Ok(())
        }
        fn position(&mut self) -> Result<Vector3, ClientError> {
            Ok(Vector3::zero())
        }
        fn velocity(&mut self) -> Result<Vector3, ClientError> {
            Ok(Vector3::zero())
        }
        fn collision_info(&mut self) -> Result<CollisionInfo, ClientError> {
            Ok(CollisionInfo::default())
        }
        fn move_by_velocity(
            &mut self,
            _velocity: Vector3,
            _duration: f64,
            _drivetrain: DrivetrainMode,
        ) -> Result<(), ClientError> {
            Ok(())
        }
        fn rotate_by_yaw_rate(&mut self, _rate: f64, _duration: f64) -> Result<(), ClientError> {
            Ok(())
        }
        fn get_images(
            &mut self,
            requests: &[ImageRequest],
        ) -> Result<Vec<DepthFrame>, ClientError> {
            Ok(requests
                .iter()
                .map(|r| {
                    let value = match r.kind {
                        ImageKind::DepthPerspective => self.perspective,
                        ImageKind::DepthVis => self.vis,
                        ImageKind::DepthPlanner => self.planner,
                        ImageKind::Segmentation => 0.0,
                    };
                    DepthFrame::uniform(4, 4, value)
                })
                .collect())
        }
    }

    fn snapshot_at(position: Vector3, velocity: Vector3, collided: bool) -> StepSnapshot {
        StepSnapshot {
            position,
            prev_position: Vector3::zero(),
            velocity,
            collision: if collided {
                CollisionInfo::collided("obstacle")
            } else {
                CollisionInfo::default()
            },
        }
    }

    fn exploration_model() -> ExplorationReward {
        ExplorationReward::new(&ExplorationRewardConfig::default()).unwrap()
    }

    #[test]
    fn exploration_collision_dominates() {
        let model = exploration_model();
        let mut client = FixedDepthClient {
            perspective: 100.0,
            vis: 100.0,
            planner: 100.0,
        };
        // collision wins regardless of altitude or depth readings
        let snapshot = snapshot_at(Vector3::new(0.0, 0.0, 1000.0), Vector3::zero(), true);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert_eq!(reward, -1000.0);
        assert!(model.is_done(reward));
    }

    #[test]
    fn exploration_height_penalty_without_collision() {
        let model = exploration_model();
        let mut client = FixedDepthClient {
            perspective: 100.0,
            vis: 100.0,
            planner: 100.0,
        };
        let snapshot = snapshot_at(Vector3::new(0.0, 0.0, 101.0), Vector3::zero(), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert_eq!(reward, -200.0);
        assert!(model.is_done(reward));
    }

    #[test]
    fn exploration_reward_clamped_at_one() {
        let model = exploration_model();
        let mut client = FixedDepthClient {
            perspective: 1e6,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = snapshot_at(Vector3::zero(), Vector3::zero(), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert_eq!(reward, 1.0);
        assert!(!model.is_done(reward));
    }

    #[test]
    fn exploration_reading_below_radius_goes_negative() {
        let model = exploration_model();
        let mut client = FixedDepthClient {
            perspective: 0.1,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = snapshot_at(Vector3::zero(), Vector3::zero(), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert!(reward < 0.0);
    }

    #[test]
    fn exploration_goal_selects_encoding() {
        let config = ExplorationRewardConfig {
            goal: DepthGoal::Planner,
            ..ExplorationRewardConfig::default()
        };
        let model = ExplorationReward::new(&config).unwrap();
        let mut client = FixedDepthClient {
            perspective: 0.0,
            vis: 0.0,
            planner: 7.0,
        };
        let snapshot = snapshot_at(Vector3::zero(), Vector3::zero(), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        // reading exactly at thresh_dist normalizes to 1
        assert!((reward - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exploration_empty_camera_list_rejected() {
        let config = ExplorationRewardConfig {
            used_cams: vec![],
            ..ExplorationRewardConfig::default()
        };
        assert!(matches!(
            ExplorationReward::new(&config),
            Err(ConfigError::EmptyCameraList)
        ));
    }

    #[test]
    fn exploration_degenerate_depth_range_rejected() {
        let config = ExplorationRewardConfig {
            thresh_dist: 7.0,
            vehicle_rad: 7.0,
            ..ExplorationRewardConfig::default()
        };
        assert!(matches!(
            ExplorationReward::new(&config),
            Err(ConfigError::DegenerateDepthRange { .. })
        ));
    }

    fn straight_path_config() -> PathRewardConfig {
        PathRewardConfig {
            collision_penalty: -1000.0,
            thresh_dist: 7.0,
            beta: 1.0,
            points: vec![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            large_dist_penalty: -10.0,
        }
    }

    #[test]
    fn path_on_line_with_zero_velocity_is_neutral() {
        let model = PathReward::new(&straight_path_config()).unwrap();
        let mut client = FixedDepthClient {
            perspective: 0.0,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = snapshot_at(Vector3::zero(), Vector3::zero(), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        // exp(0) - 0.5 = 0.5 from distance, -0.5 from zero speed
        assert!(reward.abs() < 1e-12);
        assert!(!model.is_done(reward));
    }

    #[test]
    fn path_far_from_line_pays_large_dist_penalty() {
        let model = PathReward::new(&straight_path_config()).unwrap();
        let mut client = FixedDepthClient {
            perspective: 0.0,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = snapshot_at(Vector3::new(0.0, 10.0, 0.0), Vector3::zero(), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert_eq!(reward, -10.0);
        assert!(model.is_done(reward));
    }

    #[test]
    fn path_collision_pays_collision_penalty() {
        let model = PathReward::new(&straight_path_config()).unwrap();
        let mut client = FixedDepthClient {
            perspective: 0.0,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = snapshot_at(Vector3::zero(), Vector3::zero(), true);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert_eq!(reward, -1000.0);
        assert!(model.is_done(reward));
    }

    #[test]
    fn path_speed_term_rewards_motion() {
        let model = PathReward::new(&straight_path_config()).unwrap();
        let mut client = FixedDepthClient {
            perspective: 0.0,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = snapshot_at(Vector3::zero(), Vector3::new(2.0, 0.0, 0.0), false);
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert!((reward - 2.0).abs() < 1e-12); // 0.5 + (2.0 - 0.5)
    }

    #[test]
    fn path_zero_length_segments_are_skipped() {
        let config = PathRewardConfig {
            points: vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            ..straight_path_config()
        };
        let model = PathReward::new(&config).unwrap();
        // distance comes from the one non-degenerate segment
        assert!((model.distance_to_path(Vector3::new(1.0, 3.0, 0.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn path_needs_two_waypoints() {
        let config = PathRewardConfig {
            points: vec![[0.0, 0.0, 0.0]],
            ..straight_path_config()
        };
        assert!(matches!(
            PathReward::new(&config),
            Err(ConfigError::DegeneratePath(1))
        ));
    }

    #[test]
    fn landscape_pays_horizontal_displacement() {
        let model = LandscapeReward::new(&LandscapeRewardConfig {
            collision_penalty: -1000.0,
            step_cost: 0.5,
            done_threshold: -100.0,
        });
        let mut client = FixedDepthClient {
            perspective: 0.0,
            vis: 0.0,
            planner: 0.0,
        };
        let snapshot = StepSnapshot {
            position: Vector3::new(3.0, 4.0, -20.0),
            prev_position: Vector3::zero(),
            velocity: Vector3::zero(),
            collision: CollisionInfo::default(),
        };
        let reward = model.compute_reward(&snapshot, &mut client).unwrap();
        assert!((reward - 4.5).abs() < 1e-12); // 5.0 moved, 0.5 step cost
    }

    #[test]
    fn landscape_done_tracks_cumulative_threshold() {
        let model = LandscapeReward::new(&LandscapeRewardConfig::default());
        assert!(model.tracks_cumulative());
        assert!(!model.is_done(-99.9));
        assert!(model.is_done(-100.0));
    }

    #[test]
    fn build_rejects_bad_variant_config() {
        let config = RewardConfig::Path(PathRewardConfig {
            points: vec![],
            ..PathRewardConfig::default()
        });
        assert!(build(&config).is_err());
    }
}
