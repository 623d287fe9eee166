//! State engine errors.

use thiserror::Error;

/// Errors raised by account execution, supply verification, or recovery.
#[derive(Debug, Error)]
pub enum StateError {
    /// The underlying ledger store reported an error.
    #[error("storage error: {0}")]
    Storage(#[from] ledger_store::StorageError),

    /// A transaction's structural validation failed (size, self-transfer,
    /// gas-fee bounds — see [`shared_types::transaction::Transaction::validate_structure`]).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] shared_types::TypeError),

    /// The transaction's nonce did not match `account.nonce`.
    #[error("nonce mismatch for {address}: expected {expected}, got {actual}")]
    NonceMismatch { address: String, expected: u64, actual: u64 },

    /// `available_balance` is insufficient to cover `amount + gas_fee`.
    #[error("insufficient balance for {address}: required {required}, available {available}")]
    InsufficientBalance { address: String, required: u64, available: u64 },

    /// An `Unstake` exceeded the account's `staked_balance`.
    #[error("insufficient stake for {address}: requested {requested}, staked {staked}")]
    InsufficientStake { address: String, requested: u64, staked: u64 },

    /// The fast O(1) supply tracker and the full O(accounts) scan disagree.
    /// A hard error per this node's resolution of the fast/full drift
    /// question: never silently reconciled.
    #[error("supply drift detected: tracker={tracker}, full_scan={full_scan}")]
    SupplyDrift { tracker: u64, full_scan: u64 },

    /// A commit would leave the ledger's total supply unequal to
    /// [`shared_types::TOTAL_SUPPLY`].
    #[error("supply invariant violated: total={total}, expected={expected}")]
    SupplyInvariantViolated { total: u64, expected: u64 },

    /// Attempted to restore a snapshot that does not correspond to the
    /// current dirty set (internal misuse, not a consensus error).
    #[error("snapshot mismatch: restore called without a matching begin_transaction")]
    SnapshotMismatch,
}
