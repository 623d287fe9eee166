//! Peer-to-peer block and checkpoint synchronization: wire framing,
//! message types, the peer registry, upward/downward sync decisions, and
//! fork/reorg resolution. The actual socket-accepting and retry loops live
//! in `node-runtime`, which drives these pure decision functions.

pub mod errors;
pub mod handshake;
pub mod message;
pub mod peer;
pub mod reorg;
pub mod sync;
pub mod wire;

pub use errors::SyncError;
pub use handshake::check_consensus_hash;
pub use message::{decode, encode, Handshake, Message};
pub use peer::{Peer, PeerRegistry, DEFAULT_LIVENESS};
pub use reorg::{decide_forced_resync, tie_break, ForcedResyncDecision, ReorgOutcome};
pub use sync::{
    backfill_complete, classify, next_backfill_batch, next_upward_batch, should_start_upward_sync,
    ApplyFailure, BlockDisposition,
};
pub use wire::{read_frame, write_frame, MAX_FRAME_LEN};
