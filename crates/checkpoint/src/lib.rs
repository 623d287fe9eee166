//! # Checkpoint
//!
//! Periodic, signed compressions of the world state: generation (the P0
//! gate and bounded reverse-scan rollback, the state-root Merkle tree, and
//! validator snapshot selection), single-slot persistence, and the
//! receiver-side apply pipeline (accept/no-op/drop, authoritative
//! validator-set reload, and placeholder-block install).
//!
//! This is a periodic snapshot-and-broadcast mechanism, not a voting-based
//! finality gadget: there is no attestation quorum and no notion of a
//! checkpoint being merely "justified" before it is trusted. Once a
//! checkpoint is accepted per [`apply::decide`], it is authoritative.

pub mod apply;
pub mod errors;
pub mod generation;
pub mod persistence;
pub mod scratch;
pub mod state_data;

pub use apply::{apply_accepted, decide, should_advance_head, AcceptedCheckpoint, ApplyDecision};
pub use errors::CheckpointError;
pub use generation::{build_checkpoint, select_validators, state_root, verify_or_rollback, GenerationTarget};
pub use state_data::StateSnapshot;
