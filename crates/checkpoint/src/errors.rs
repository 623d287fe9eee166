//! Checkpoint generation/apply errors.

use thiserror::Error;

/// Errors raised by checkpoint generation, application, or state-data
/// transfer.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The underlying ledger store reported an error.
    #[error("storage error: {0}")]
    Storage(#[from] ledger_store::StorageError),

    /// The state engine reported an error (execution or supply).
    #[error("state error: {0}")]
    State(#[from] state_engine::StateError),

    /// The bounded reverse scan exhausted `max_scan` blocks without
    /// finding a height whose state satisfies P0.
    #[error("no height in the last {max_scan} blocks before {scanned_from} satisfies the supply invariant")]
    NoValidRollbackTarget { scanned_from: u64, max_scan: u64 },

    /// A block the reverse scan needed to replay was missing.
    #[error("block at height {0} missing during rollback scan")]
    MissingBlock(u64),

    /// Filesystem I/O, or gzip (de)compression, failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state snapshot's JSON encoding was malformed.
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A checkpoint's `signing_bytes` did not verify under its claimed
    /// proposer's public key.
    #[error("checkpoint signature failed to verify")]
    SignatureInvalid,
}
