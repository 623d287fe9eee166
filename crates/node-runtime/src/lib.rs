//! The node runtime: the composition root that turns `shared-types`,
//! `shared-crypto`, `ledger-store`, `state-engine`, `consensus`,
//! `checkpoint`, `p2p-sync` and `block-producer` into a running node.
//!
//! There is no event bus and no global component registry here (§9) —
//! [`node::Node`] owns every collaborator directly and wires them together
//! at construction. `p2p` drives the peer accept loop and handshake,
//! `scheduler` drives the production loop on a fixed cadence.

pub mod activation;
pub mod config;
pub mod errors;
pub mod node;
pub mod p2p;
pub mod recovery;
pub mod scheduler;

pub use config::{load_consensus_config, NodeConfig};
pub use errors::RuntimeError;
pub use node::Node;
