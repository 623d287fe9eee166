//! Checkpoints: signed, periodic compressions of the world state.

use crate::address::Address;
use crate::canonical::ByteBuilder;
use crate::hash::{sha3_256, Hash};
use serde::{Deserialize, Serialize};

/// A validator as recorded inside a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSnapshot {
    /// The validator's address.
    pub address: Address,
    /// Stake at checkpoint time.
    pub stake: u64,
    /// First 32 bytes of the validator's VRF public key.
    pub vrf_pubkey: [u8; 32],
}

/// A signed, periodic compression of the world state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Height this checkpoint anchors.
    pub height: u64,
    /// Hash of the block at `height`.
    pub block_hash: Hash,
    /// Hash of the block at `height - 1`.
    pub previous_hash: Hash,
    /// Merkle root over every account, sorted by address.
    pub state_root: Hash,
    /// Milliseconds since the Unix epoch, used for elder-brother comparison.
    pub timestamp: u64,
    /// The validator that produced this checkpoint.
    pub proposer: Address,
    /// The active validator set as of this checkpoint, used verbatim by
    /// every peer that accepts it (authoritative, never rebuilt locally).
    pub validators: Vec<ValidatorSnapshot>,
    /// Signature over [`Checkpoint::signing_bytes`].
    pub signature: Vec<u8>,
}

impl Checkpoint {
    /// Bytes that are signed: every field except `signature`, including
    /// the validator list.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut b = ByteBuilder::new()
            .u64(self.height)
            .bytes(&self.block_hash)
            .bytes(&self.previous_hash)
            .bytes(&self.state_root)
            .u64(self.timestamp)
            .str(self.proposer.as_str())
            .u32(self.validators.len() as u32);
        for v in &self.validators {
            b = b.str(v.address.as_str()).u64(v.stake).bytes(&v.vrf_pubkey);
        }
        b.finish()
    }

    /// Content hash of this checkpoint (used for fork-comparison and as the
    /// anchor-checkpoint hash fed into proposer election).
    pub fn hash(&self) -> Hash {
        sha3_256(&self.signing_bytes())
    }

    /// The active subset used for this cycle's proposer draws: at most
    /// `active_set_size`, sorted by `(-stake, address)`.
    pub fn active_set(&self, active_set_size: usize) -> Vec<&ValidatorSnapshot> {
        let mut v: Vec<&ValidatorSnapshot> = self.validators.iter().collect();
        v.sort_by(|a, b| b.stake.cmp(&a.stake).then_with(|| a.address.cmp(&b.address)));
        v.truncate(active_set_size);
        v
    }
}
