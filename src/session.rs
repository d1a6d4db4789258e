//! The flight session: a synchronous control loop driving one vehicle.
//!
//! Each step flows perception -> action -> command -> settle -> telemetry
//! -> reward -> experience -> training. Episodes end when the reward
//! model says so or when the per-episode safety cap trips; the session
//! ends after the configured total step budget.

use std::fmt;
use std::time::Duration;

use tracing::info;

use crate::action_space::{self, ActionSpace};
use crate::agent::DeepQAgent;
use crate::client::{FlightClient, ImageKind, ImageRequest};
use crate::config::RootConfig;
use crate::error::{ClientError, SessionError};
use crate::observation::{Frame, FrameStack};
use crate::qfunc::QFunction;
use crate::reward::{self, RewardModel};
use crate::types::{ControlCommand, DrivetrainMode, Pose, StepSnapshot, Vector3};

/// Caller-side options not part of the config document.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Lock yaw to the velocity heading on velocity commands.
    pub forward_only: bool,
    /// Per-episode step cap; exceeding it forces the episode done.
    pub max_flight_steps: u64,
    /// Camera polled for the observation frames.
    pub camera_id: u8,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            forward_only: false,
            max_flight_steps: 2500,
            camera_id: 3,
        }
    }
}

/// Aggregate results of a finished session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Environment steps executed.
    pub total_steps: u64,
    /// Episodes that reached a done condition.
    pub episodes: usize,
    /// Mean reward over completed episodes.
    pub mean_episode_reward: f64,
    /// Mean length of completed episodes, in steps.
    pub mean_episode_length: f64,
}

impl SessionSummary {
    fn from_episodes(total_steps: u64, rewards: &[f64], lengths: &[u64]) -> Self {
        let episodes = rewards.len();
        let (mean_reward, mean_length) = if episodes > 0 {
            (
                rewards.iter().sum::<f64>() / episodes as f64,
                lengths.iter().sum::<u64>() as f64 / episodes as f64,
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            total_steps,
            episodes,
            mean_episode_reward: mean_reward,
            mean_episode_length: mean_length,
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "steps={} episodes={} mean_reward={:.3} mean_length={:.1}",
            self.total_steps, self.episodes, self.mean_episode_reward, self.mean_episode_length
        )
    }
}

/// Owns the environment handle and orchestrates the episode/step cycle.
///
/// # Lifecycle
///
/// 1. Construct with a connected client, validated config, and an agent.
/// 2. Call [`FlightSession::run`]; it blocks until the total step budget
///    is exhausted or an environment failure propagates.
/// 3. Inspect the returned [`SessionSummary`].
pub struct FlightSession<C: FlightClient, Q: QFunction> {
    client: C,
    config: RootConfig,
    action_space: Box<dyn ActionSpace>,
    reward_model: Box<dyn RewardModel>,
    agent: DeepQAgent<Q>,
    options: SessionOptions,
}

impl<C: FlightClient, Q: QFunction> FlightSession<C, Q> {
    /// Builds a session, constructing the action space and reward model
    /// from the config. All configuration errors surface here, before
    /// the vehicle moves.
    pub fn new(
        client: C,
        config: RootConfig,
        agent: DeepQAgent<Q>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let action_space = action_space::build(&config.action_config)?;
        let reward_model = reward::build(&config.reward_config)?;
        Ok(Self {
            client,
            config,
            action_space,
            reward_model,
            agent,
            options,
        })
    }

    /// Runs the full training session.
    ///
    /// Environment-command failures are not retried; they abort the loop
    /// and propagate to the caller.
    pub fn run(&mut self) -> Result<SessionSummary, SessionError> {
        self.client.reset()?;
        self.client.enable_api_control(true)?;
        self.client.arm(true)?;
        let start_pose = self.resolve_start_pose()?;

        let first = self.capture_frame()?;
        let mut stack = FrameStack::seeded(first);

        let max_steps = self.config.max_steps();
        let mut current_step: u64 = 0;
        let mut episode_steps: u64 = 0;
        let mut episode_reward = 0.0;
        let mut episode_rewards: Vec<f64> = Vec::new();
        let mut episode_lengths: Vec<u64> = Vec::new();

        info!(
            max_steps,
            action_space = self.action_space.name(),
            reward_model = self.reward_model.name(),
            "session started"
        );

        while current_step < max_steps {
            episode_steps += 1;

            let observation = stack.flatten();
            let action = self.agent.act(&observation);
            let command = self.action_space.interpret(action)?;

            let prev_position = self.client.position()?;
            self.issue_command(command)?;
            self.settle();

            let snapshot = StepSnapshot {
                position: self.client.position()?,
                prev_position,
                velocity: self.client.velocity()?,
                collision: self.client.collision_info()?,
            };

            let reward = self
                .reward_model
                .compute_reward(&snapshot, &mut self.client)?;
            episode_reward += reward;

            // the done verdict belongs to the reward model; cumulative
            // models judge the episode total instead of the instant value
            let done_signal = if self.reward_model.tracks_cumulative() {
                episode_reward
            } else {
                reward
            };
            let model_done = self.reward_model.is_done(done_signal);

            info!(
                step = current_step,
                action,
                reward,
                episode_reward,
                done = model_done,
                "step processed"
            );

            self.agent.observe(&observation, action, reward, model_done);
            self.agent.train();

            let mut done = model_done;
            if episode_steps > self.options.max_flight_steps {
                done = true;
            }

            if done {
                info!(
                    episode = episode_rewards.len() + 1,
                    steps = episode_steps,
                    reward = episode_reward,
                    "episode finished"
                );
                episode_rewards.push(episode_reward);
                episode_lengths.push(episode_steps);
                self.reset_vehicle(&start_pose)?;
                episode_steps = 0;
                episode_reward = 0.0;
            }

            current_step += 1;

            let frame = self.capture_frame()?;
            stack.push(frame);
        }

        let summary =
            SessionSummary::from_episodes(current_step, &episode_rewards, &episode_lengths);
        info!(%summary, "session terminated");
        Ok(summary)
    }

    /// The learning agent (for inspection after a run).
    pub fn agent(&self) -> &DeepQAgent<Q> {
        &self.agent
    }

    fn resolve_start_pose(&mut self) -> Result<Pose, SessionError> {
        if self.config.use_flag_pos {
            return Ok(Pose::level_at(self.client.position()?));
        }
        let position = Vector3::new(self.config.init_x, self.config.init_y, self.config.init_z);
        let pose = Pose::level_at(position);
        info!(%position, "ignoring spawn flag, using configured start pose");
        self.client.set_pose(&pose, true)?;
        Ok(pose)
    }

    fn reset_vehicle(&mut self, start_pose: &Pose) -> Result<(), SessionError> {
        self.client.reset()?;
        self.client.enable_api_control(true)?;
        self.client.arm(true)?;
        if !self.config.use_flag_pos {
            self.client.set_pose(start_pose, true)?;
        }
        Ok(())
    }

    fn issue_command(&mut self, command: ControlCommand) -> Result<(), ClientError> {
        match command {
            ControlCommand::Velocity(velocity) => {
                let drivetrain = if self.options.forward_only {
                    DrivetrainMode::ForwardOnly
                } else {
                    DrivetrainMode::MaxDegreeOfFreedom
                };
                self.client
                    .move_by_velocity(velocity, self.config.move_duration, drivetrain)
            }
            ControlCommand::YawRate(rate) => self
                .client
                .rotate_by_yaw_rate(rate, self.config.move_duration),
        }
    }

    fn capture_frame(&mut self) -> Result<Frame, ClientError> {
        let requests = [ImageRequest::new(
            self.options.camera_id,
            ImageKind::DepthPerspective,
        )];
        let responses = self.client.get_images(&requests)?;
        match responses.first() {
            Some(depth) => Ok(Frame::from_depth(depth)),
            None => Err(ClientError::EmptyImageResponse),
        }
    }

    fn settle(&mut self) {
        if self.config.sleep_time > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(self.config.sleep_time));
        }
    }
}
