//! Errors produced while constructing or validating domain entities.

use thiserror::Error;

/// Errors that can occur when building or validating a domain type.
#[derive(Debug, Clone, Error)]
pub enum TypeError {
    /// An address string failed the checksum/format check.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A transaction violated one of the structural invariants in §3.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// `data` exceeded the configured size bound.
    #[error("data field too large: {actual} bytes, max {max}")]
    DataTooLarge { actual: usize, max: usize },

    /// A gas fee fell outside `[min_gas_fee, max_gas_fee]` for a `Transfer`.
    #[error("gas fee {fee} outside allowed range [{min}, {max}]")]
    GasFeeOutOfRange { fee: u64, min: u64, max: u64 },

    /// `from == to` on a transaction type that forbids it.
    #[error("self-transfer not permitted for transaction type {0:?}")]
    SelfTransferForbidden(crate::transaction::TxType),
}
