// Thin harness around the aeroq library: parses the CLI, loads the JSON
// config, and runs a flight session against the synthetic simulator.
// All of the real logic lives in the lib crate.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aeroq::{
    action_space, ConfigError, ConstantExplorer, DeepQAgent, Explorer, FlightSession, FrameStack,
    JsonCheckpoint, KinematicSim, LinearEpsilonAnnealingExplorer, LinearQFunction, QFunction,
    RootConfig, SessionError, SessionOptions,
};

/// Command-line arguments for the aeroq binary.
#[derive(Parser, Debug)]
#[command(
    name = "aeroq",
    about = "Deep Q-learning flight control for simulated multirotors"
)]
struct Cli {
    /// Path to the JSON training configuration.
    config: PathBuf,

    /// Directory receiving checkpoint snapshots.
    #[arg(long, default_value = "traindir")]
    traindir: PathBuf,

    /// Resume the value function from a JSON checkpoint.
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Lock yaw to the velocity heading on velocity commands.
    #[arg(long)]
    forward_only: bool,

    /// Per-episode step cap before the episode is forced done.
    #[arg(long, default_value_t = 2500)]
    max_flight_steps: u64,

    /// Disable exploration entirely (deterministic evaluation run).
    #[arg(long)]
    no_random: bool,

    /// Half-extent of the synthetic world, in meters.
    #[arg(long, default_value_t = 60.0)]
    world_half_extent: f64,
}

fn build_explorer(cli: &Cli, config: &RootConfig) -> Box<dyn Explorer> {
    if cli.no_random {
        Box::new(ConstantExplorer::new(0.0))
    } else {
        Box::new(LinearEpsilonAnnealingExplorer::new(
            1.0,
            0.1,
            config.annealing_steps,
        ))
    }
}

/// Builds the value function, resuming from a checkpoint when one is
/// given on the command line.
fn build_qfunction(cli: &Cli, num_actions: usize) -> Result<LinearQFunction, ConfigError> {
    let Some(path) = &cli.checkpoint else {
        return Ok(LinearQFunction::new(FrameStack::DIM, num_actions, 1e-4));
    };
    let raw = std::fs::read_to_string(path)?;
    let restored: LinearQFunction = serde_json::from_str(&raw)?;
    if restored.num_actions() != num_actions {
        return Err(ConfigError::CheckpointMismatch {
            expected: num_actions,
            actual: restored.num_actions(),
        });
    }
    Ok(restored)
}

fn main() -> Result<(), SessionError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = RootConfig::from_json_file(&cli.config)?;

    let space = action_space::build(&config.action_config)?;
    let qfunction = build_qfunction(&cli, space.num_actions())?;
    let explorer = build_explorer(&cli, &config);

    let mut agent = DeepQAgent::new(qfunction, explorer, &config, rand::random());
    match JsonCheckpoint::create(&cli.traindir) {
        Ok(sink) => {
            tracing::info!(run_id = sink.run_id(), dir = %cli.traindir.display(), "checkpointing enabled");
            agent.set_checkpoint(Box::new(sink));
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to create traindir, checkpoints disabled");
        }
    }

    let options = SessionOptions {
        forward_only: cli.forward_only,
        max_flight_steps: cli.max_flight_steps,
        ..SessionOptions::default()
    };
    let client = KinematicSim::new(cli.world_half_extent);

    let mut session = FlightSession::new(client, config, agent, options)?;
    let summary = session.run()?;
    println!("{summary}");
    Ok(())
}
