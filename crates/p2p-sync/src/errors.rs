//! P2P sync errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Framing or transport I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame's length prefix exceeded [`crate::wire::MAX_FRAME_LEN`].
    #[error("frame of {0} bytes exceeds the {max} byte cap", max = crate::wire::MAX_FRAME_LEN)]
    FrameTooLarge(u32),

    /// A received frame failed to decode as a [`crate::message::Message`].
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The peer's `consensus_hash` did not match ours.
    #[error("consensus hash mismatch: wrong network")]
    WrongNetwork,

    /// The underlying ledger store reported an error.
    #[error("storage error: {0}")]
    Storage(#[from] ledger_store::StorageError),

    /// The state engine reported an error.
    #[error("state error: {0}")]
    State(#[from] state_engine::StateError),

    /// The checkpoint crate reported an error.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    /// Consensus block validation rejected a block during sync apply.
    #[error("consensus error: {0}")]
    Consensus(#[from] consensus::ConsensusError),
}
