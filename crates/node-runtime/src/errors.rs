//! The composition root's own error type: everything a collaborator crate
//! can fail with, plus the config/IO failures specific to wiring.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] ledger_store::StorageError),

    #[error(transparent)]
    State(#[from] state_engine::StateError),

    #[error(transparent)]
    Consensus(#[from] consensus::ConsensusError),

    #[error(transparent)]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error(transparent)]
    Producer(#[from] block_producer::ProducerError),

    #[error(transparent)]
    Sync(#[from] p2p_sync::SyncError),
}
