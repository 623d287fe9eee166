//! Account state.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// The kind of participant an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// An ordinary, non-staking account.
    Regular,
    /// A bonded validator (subject to `is_validator` once staked enough).
    Validator,
    /// A light client account (read-only participant, never bonds).
    Light,
    /// A proxy/relay account used by external collaborators (e.g. wallets).
    Proxy,
}

/// Per-address account state, as stored in the sharded account store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account's address.
    pub address: Address,
    /// Spendable balance, minor units.
    pub available_balance: u64,
    /// Bonded/staked balance, minor units.
    pub staked_balance: u64,
    /// Next expected transaction nonce for this account.
    pub nonce: u64,
    /// The account's declared node type.
    pub node_type: NodeType,
}

impl Account {
    /// Build a fresh account with zero balances, created on first credit.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            available_balance: 0,
            staked_balance: 0,
            nonce: 0,
            node_type: NodeType::Regular,
        }
    }

    /// `is_validator ≡ node_type = Validator ∧ staked_balance ≥ min_stake`.
    pub fn is_validator(&self, min_stake: u64) -> bool {
        self.node_type == NodeType::Validator && self.staked_balance >= min_stake
    }

    /// Total balance held by this account (`available + staked`).
    ///
    /// Invariant: this never overflows `u64` (`available + staked ≤
    /// 2^64 − 1`); callers that mutate balances are responsible for
    /// preserving it.
    pub fn total(&self) -> u64 {
        self.available_balance + self.staked_balance
    }

    /// Canonical leaf bytes for the checkpoint Merkle tree:
    /// `sha3(address ‖ available ‖ staked ‖ nonce ‖ node_type)`.
    pub fn merkle_leaf_preimage(&self) -> Vec<u8> {
        use crate::canonical::ByteBuilder;
        ByteBuilder::new()
            .str(self.address.as_str())
            .u64(self.available_balance)
            .u64(self.staked_balance)
            .u64(self.nonce)
            .u8(node_type_tag(self.node_type))
            .finish()
    }
}

fn node_type_tag(t: NodeType) -> u8 {
    match t {
        NodeType::Regular => 0,
        NodeType::Validator => 1,
        NodeType::Light => 2,
        NodeType::Proxy => 3,
    }
}
