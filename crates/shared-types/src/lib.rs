//! # Shared Types
//!
//! Domain entities, canonical byte encodings, and the global consensus
//! configuration used by every other crate in this workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-crate type is defined here.
//! - **Canonical encodings over derive output**: anything that is hashed or
//!   signed (transaction signing bytes, block hashes, the checkpoint body,
//!   the consensus hash) is built through [`canonical::ByteBuilder`], never
//!   through `serde`/`bincode`'s default representation, so the byte layout
//!   is stable regardless of struct field order.
//! - **No mutable globals**: [`config::ConsensusConfig`] is loaded once and
//!   passed around as an `Arc`; the only process-wide constant is
//!   [`TOTAL_SUPPLY`], which is fixed at compile time.

pub mod account;
pub mod address;
pub mod block;
pub mod canonical;
pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod hash;
pub mod merkle;
pub mod transaction;

pub use account::{Account, NodeType};
pub use address::Address;
pub use block::{Block, BlockHeader, PlaceholderBlock, RealBlock};
pub use checkpoint::{Checkpoint, ValidatorSnapshot};
pub use config::{ConsensusConfig, RewardThreshold};
pub use errors::TypeError;
pub use hash::{sha3_256, Hash};
pub use transaction::{Transaction, TxType};

/// Total supply of the ledger, fixed for the lifetime of the chain (P0).
///
/// Expressed in minor units. Every committed state transition must leave
/// `sum_over_all_accounts(available + staked)` equal to this constant.
pub const TOTAL_SUPPLY: u64 = 1_400_000_000_000_000;
