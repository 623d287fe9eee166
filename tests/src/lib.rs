//! Cross-crate integration tests for full-node scenarios that no single
//! crate's unit tests can exercise on their own: crash-replay against real
//! `ledger-store` I/O, a proposer-mismatch reorg, and a checkpoint-anchored
//! forced resync.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── crash_replay.rs
//!     ├── vrf_mismatch_reorg.rs
//!     └── checkpoint_overtake.rs
//! ```
//!
//! ```bash
//! cargo test -p qc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
