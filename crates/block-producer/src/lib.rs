//! Block assembly and the validator production scheduler (§4.4): pending
//! transaction dedup and admission, the scheduler's gating/wait/failover
//! decisions, header and VRF assembly, strict-mode execution with atomic
//! commit, and the periodic checkpoint trigger.
//!
//! This crate produces blocks; it does not validate them against the
//! active set or a parent — that is `consensus::validate_block`'s job,
//! called by the node-runtime loop before broadcasting what this crate
//! assembles.

pub mod assembly;
pub mod checkpoint_trigger;
pub mod dedup;
pub mod errors;
pub mod gating;
pub mod ports;
pub mod producer;

pub use dedup::{dedupe_and_admit, AccountView};
pub use errors::ProducerError;
pub use gating::{decide_proposer_action, ready_to_produce, should_sync_before_producing, should_wait_for_gate, ProposerDecision};
pub use ports::BlockSink;
pub use producer::{produce_block, ProducedBlock};
