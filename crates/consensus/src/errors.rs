//! Consensus errors.

use thiserror::Error;

/// Block validation and proposer-election errors. Per this node's
/// propagation policy, a validation failure rejects the one block, not the
/// chain.
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// `B_prev.height + 1 != header.height`.
    #[error("height mismatch: expected {expected}, got {actual}")]
    HeightMismatch { expected: u64, actual: u64 },

    /// `previous_hash` did not match `hash(B_prev)`.
    #[error("invalid previous hash")]
    InvalidPreviousHash,

    /// `timestamp` did not strictly increase over the parent.
    #[error("timestamp did not increase: parent {parent}, block {block}")]
    TimestampNotIncreasing { parent: u64, block: u64 },

    /// `timestamp` is further in the future than the drift tolerance
    /// permits (only enforced when not synchronizing).
    #[error("timestamp too far in the future: block {block}, now {now}")]
    TimestampTooFarAhead { block: u64, now: u64 },

    /// `tx_root` did not match the re-hashed transaction list.
    #[error("tx_root mismatch")]
    TxRootMismatch,

    /// A transaction in the block failed structural validation.
    #[error("invalid transaction in block: {0}")]
    InvalidTransaction(#[from] shared_types::TypeError),

    /// `header.proposer` is not a member of the active set.
    #[error("proposer {0} is not in the active set")]
    ProposerNotActive(String),

    /// The active set is empty, so no proposer can be elected.
    #[error("active validator set is empty")]
    EmptyActiveSet,
}
