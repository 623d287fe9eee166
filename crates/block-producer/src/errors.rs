//! Block producer errors.

use thiserror::Error;

/// Errors raised while assembling or committing a block.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// The underlying ledger store reported an error.
    #[error("storage error: {0}")]
    Storage(#[from] ledger_store::StorageError),

    /// State execution failed partway through the block; the cache has
    /// already been restored to its pre-execution snapshot.
    #[error("state error: {0}")]
    State(#[from] state_engine::StateError),

    /// A checkpoint-generation attempt failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    /// Consensus rejected the assembled block before it was committed.
    #[error("consensus error: {0}")]
    Consensus(#[from] consensus::ConsensusError),

    /// Attempted to assemble a block while not the expected proposer and
    /// without having failed over.
    #[error("not the expected proposer for height {height}")]
    NotProposer { height: u64 },
}
