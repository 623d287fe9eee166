//! # Consensus
//!
//! The validator set, VRF-seeded cycle-stable proposer election, block
//! validation rules, and the halving reward schedule.
//!
//! The active set is populated exclusively from the most recently applied
//! checkpoint — never rebuilt from live accounts mid-cycle — so every
//! honest node computes the same proposer for a given height
//! ([`election::elect`]). [`validator::LiveValidatorRegistry`] is a
//! separate, continuously-updated view driven by
//! [`state_engine::ValidatorSetObserver`] callbacks, consulted by the
//! validator-activation gate rather than by election.

pub mod election;
pub mod errors;
pub mod reward;
pub mod validation;
pub mod validator;

pub use election::{cycle_position, elect};
pub use errors::ConsensusError;
pub use reward::block_reward;
pub use validation::{validate_block, MAX_FUTURE_DRIFT_SECS};
pub use validator::{ActiveValidatorSet, LiveValidatorRegistry};
