//! Blocks. Modeled as a sum type: a [`RealBlock`] (header + body, hash
//! computed from the header) or a [`PlaceholderBlock`] (a sentinel installed
//! from a checkpoint before the matching real block has arrived, whose
//! `hash()` returns the authoritative checkpoint-recorded value).

use crate::address::Address;
use crate::canonical::ByteBuilder;
use crate::hash::{sha3_256, Hash};
use crate::merkle::merkle_root;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Block header: everything that is hashed to produce the block hash,
/// except the signature itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height in the chain. Genesis is height 0.
    pub height: u64,
    /// Hash of the previous block.
    pub previous_hash: Hash,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// State root after applying this block's transactions.
    pub state_root: Hash,
    /// Merkle root of `transactions`.
    pub tx_root: Hash,
    /// The validator that produced this block.
    pub proposer: Address,
    /// VRF proof over `previous_hash ‖ be64(height)`.
    pub vrf_proof: Vec<u8>,
    /// VRF output derived from `vrf_proof`.
    pub vrf_output: Hash,
    /// Proposer's signature over [`BlockHeader::signing_bytes`].
    pub signature: Vec<u8>,
}

impl BlockHeader {
    /// Bytes that are hashed and signed: every field except `signature`.
    pub fn signing_bytes(&self) -> Vec<u8> {
        ByteBuilder::new()
            .u64(self.height)
            .bytes(&self.previous_hash)
            .u64(self.timestamp)
            .bytes(&self.state_root)
            .bytes(&self.tx_root)
            .str(self.proposer.as_str())
            .var_bytes(&self.vrf_proof)
            .bytes(&self.vrf_output)
            .finish()
    }

    /// The block hash: `sha3(signing_bytes)`.
    pub fn hash(&self) -> Hash {
        sha3_256(&self.signing_bytes())
    }
}

/// A block with a real header and body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealBlock {
    /// The block header.
    pub header: BlockHeader,
    /// The transactions included in this block, in execution order.
    pub transactions: Vec<Transaction>,
    /// Optional encrypted payload for non-ledger messages (AEAD is an
    /// external collaborator; this crate only carries the opaque bytes).
    pub data: Option<Vec<u8>>,
}

impl RealBlock {
    /// Recompute the Merkle root over `transactions` and compare to
    /// `header.tx_root`.
    pub fn tx_root_matches(&self) -> bool {
        self.recompute_tx_root() == self.header.tx_root
    }

    /// Recompute the Merkle root over `transactions` in block order.
    pub fn recompute_tx_root(&self) -> Hash {
        let leaves: Vec<Hash> = self.transactions.iter().map(Transaction::hash).collect();
        merkle_root(&leaves)
    }
}

/// A synthetic block installed when a checkpoint names a block height that
/// has not yet been fetched from peers. Its `hash` is the checkpoint's
/// recorded `block_hash`, so that validation of the following real block
/// can succeed without re-deriving a hash from absent data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderBlock {
    /// Height this placeholder stands in for.
    pub height: u64,
    /// The authoritative hash, taken verbatim from the checkpoint.
    pub hash: Hash,
    /// The checkpoint's recorded timestamp, used for ordering checks.
    pub timestamp: u64,
}

/// A block, real or placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Block {
    /// A fully materialized block.
    Real(RealBlock),
    /// A checkpoint-installed placeholder awaiting the real block.
    Placeholder(PlaceholderBlock),
}

impl Block {
    /// The block's hash: computed for `Real`, stored verbatim for
    /// `Placeholder`.
    pub fn hash(&self) -> Hash {
        match self {
            Block::Real(b) => b.header.hash(),
            Block::Placeholder(p) => p.hash,
        }
    }

    /// The block's height.
    pub fn height(&self) -> u64 {
        match self {
            Block::Real(b) => b.header.height,
            Block::Placeholder(p) => p.height,
        }
    }

    /// The block's timestamp (milliseconds since epoch).
    pub fn timestamp(&self) -> u64 {
        match self {
            Block::Real(b) => b.header.timestamp,
            Block::Placeholder(p) => p.timestamp,
        }
    }

    /// Whether this block is a placeholder. Block validation must skip the
    /// `prev_hash` check against the *next* block when its predecessor is
    /// a placeholder (the real predecessor's hash is unknown).
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Block::Placeholder(_))
    }

    /// Unwrap as a real block, if it is one.
    pub fn as_real(&self) -> Option<&RealBlock> {
        match self {
            Block::Real(b) => Some(b),
            Block::Placeholder(_) => None,
        }
    }
}
