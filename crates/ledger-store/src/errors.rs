//! Ledger store errors.

use thiserror::Error;

/// Errors raised by the block chunk store or the sharded account store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem or KV-engine I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The embedded KV engine reported an error.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization of a stored record failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A read targeted a height or hash that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The data file's trailing hash did not match the verifying reader's
    /// recomputation — corruption or a torn write that escaped repair.
    #[error("checksum mismatch for block at height {height}")]
    ChecksumMismatch { height: u64 },
}

impl From<rocksdb::Error> for StorageError {
    fn from(e: rocksdb::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}
