//! # State Engine
//!
//! Accounting over the fixed-supply ledger: the account cache and dirty
//! set, per-transaction execution, the P0 supply tracker and its dual
//! verifier, and crash-recovery replay.
//!
//! ## Design
//!
//! - **No global mutable validator set**: `Stake`/`Unstake` report
//!   crossings of the validator-stake threshold through
//!   [`ports::ValidatorSetObserver`], a trait object injected at
//!   construction. Consensus owns the actual validator set.
//! - **Confiscation is a transition, not an abort**: a forged signature or
//!   address moves the real key owner's balances to genesis and continues
//!   executing the carrying block.
//! - **Single debit/credit discipline**: every balance mutation in
//!   [`executor`] goes through the tracker in lockstep, which is what
//!   keeps P0 from drifting (see [`supply`]).

pub mod cache;
pub mod errors;
pub mod executor;
pub mod ports;
pub mod recovery;
pub mod supply;

pub use cache::{AccountCache, CacheSnapshot};
pub use errors::StateError;
pub use executor::TransactionExecutor;
pub use ports::{AccountLedger, BlockSource, NullValidatorSetObserver, ValidatorSetObserver};
pub use recovery::{plan_recovery, replay, ReplayPlan};
pub use supply::{dual_verify, full_scan, SupplyTracker};
