//! Single-slot on-disk persistence for the most recently generated or
//! accepted checkpoint: `checkpoint_latest.json` and `state_latest.gz`,
//! both overwritten wholesale on every generation or accepted apply —
//! never versioned, never appended to.

use crate::errors::CheckpointError;
use crate::state_data::{self, StateSnapshot};
use shared_types::Checkpoint;
use std::fs;
use std::path::{Path, PathBuf};

const CHECKPOINT_FILE: &str = "checkpoint_latest.json";
const STATE_FILE: &str = "state_latest.gz";

fn checkpoint_path(dir: &Path) -> PathBuf {
    dir.join(CHECKPOINT_FILE)
}

fn state_path(dir: &Path) -> PathBuf {
    dir.join(STATE_FILE)
}

/// Overwrite `checkpoint_latest.json` with `checkpoint`.
pub fn write_checkpoint(dir: &Path, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_vec_pretty(checkpoint)?;
    fs::write(checkpoint_path(dir), json)?;
    Ok(())
}

/// Read the persisted checkpoint, if one has ever been written.
pub fn read_checkpoint(dir: &Path) -> Result<Option<Checkpoint>, CheckpointError> {
    match fs::read(checkpoint_path(dir)) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Gzip-compress `snapshot` and overwrite `state_latest.gz`. Returns the
/// compressed bytes so the caller can broadcast the same payload it just
/// persisted.
pub fn write_state_snapshot(dir: &Path, snapshot: &StateSnapshot) -> Result<Vec<u8>, CheckpointError> {
    fs::create_dir_all(dir)?;
    let gz = state_data::compress(snapshot)?;
    fs::write(state_path(dir), &gz)?;
    Ok(gz)
}

/// Read and decompress the persisted state snapshot, if any.
pub fn read_state_snapshot(dir: &Path) -> Result<Option<StateSnapshot>, CheckpointError> {
    match fs::read(state_path(dir)) {
        Ok(bytes) => Ok(Some(state_data::decompress(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete both single-slot files, e.g. as the first step of a checkpoint-
/// anchored forced resync.
pub fn delete_checkpoint_files(dir: &Path) -> Result<(), CheckpointError> {
    for path in [checkpoint_path(dir), state_path(dir)] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
