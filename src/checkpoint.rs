//! Checkpoint sinks for periodic parameter persistence.
//!
//! The agent only needs a "persist now" hook; the sink decides format
//! and destination. `NoopCheckpoint` discards everything, and
//! `JsonCheckpoint` writes one JSON snapshot per persist call into a
//! training directory.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Destination for periodic parameter snapshots.
pub trait CheckpointSink: Send {
    /// Persists a snapshot taken at the given training step.
    fn persist(&mut self, step: u64, snapshot: &serde_json::Value) -> io::Result<()>;
}

/// Sink that discards all snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCheckpoint;

impl CheckpointSink for NoopCheckpoint {
    fn persist(&mut self, _step: u64, _snapshot: &serde_json::Value) -> io::Result<()> {
        Ok(())
    }
}

/// Writes JSON snapshots into a training directory.
///
/// Each run gets a fresh id so restarted sessions never clobber an
/// earlier run's files.
pub struct JsonCheckpoint {
    dir: PathBuf,
    run_id: String,
}

impl JsonCheckpoint {
    /// Creates the training directory (if needed) and a new run id.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            run_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// The run identifier embedded in every snapshot filename.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl CheckpointSink for JsonCheckpoint {
    fn persist(&mut self, step: u64, snapshot: &serde_json::Value) -> io::Result<()> {
        let path = self
            .dir
            .join(format!("checkpoint-{}-{:010}.json", self.run_id, step));
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, snapshot)?;
        Ok(())
    }
}
