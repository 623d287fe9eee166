//! The global, immutable consensus configuration.
//!
//! Loaded once at startup (see `node-runtime::config`) and shared as an
//! `Arc<ConsensusConfig>`; never mutated. [`ConsensusConfig::consensus_hash`]
//! is included in every peer handshake so that two nodes with incompatible
//! parameters refuse to talk to each other.

use crate::canonical::ByteBuilder;
use crate::hash::{sha3_256, Hash};
use serde::{Deserialize, Serialize};

/// One point on the reward halving schedule: below this much genesis
/// `available_balance`, the reward halves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardThreshold {
    /// Genesis `available_balance` threshold, minor units.
    pub balance: u64,
}

/// All chain-wide parameters, grouped per §3 "Global configuration".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Protocol version.
    pub version: u16,

    // -- Chain params --
    /// Human-readable chain identifier.
    pub chain_id: String,
    /// Genesis timestamp, milliseconds since epoch.
    pub genesis_timestamp: u64,
    /// Display unit name (e.g. "FAN").
    pub unit_name: String,
    /// Minor-unit decimal places.
    pub decimals: u8,

    // -- Block params --
    /// Target milliseconds between blocks.
    pub block_interval_ms: u64,
    /// Blocks between checkpoints.
    pub checkpoint_interval: u64,
    /// Maximum serialized block size, bytes.
    pub max_block_size: u64,
    /// Percentage of `max_block_size` below which optional `data` may be
    /// attached to a block.
    pub data_threshold_percent: u8,

    // -- Economic params --
    /// Minimum `gas_fee` for a `Transfer`.
    pub min_gas_fee: u64,
    /// Maximum `gas_fee` for a `Transfer`.
    pub max_gas_fee: u64,
    /// Base block reward before halving.
    pub base_block_reward: u64,
    /// Reward floor once halving would drive it below this.
    pub min_reward_unit: u64,
    /// Minimum stake for the validator predicate.
    pub validator_stake_required: u64,

    // -- Validator params --
    /// Maximum validators recorded in a checkpoint.
    pub max_validators: u32,
    /// Maximum validators drawn from for proposer election.
    pub active_set_size: u32,
    /// Blocks of slack before a checkpoint during which activation waits.
    pub checkpoint_activation_buffer: u64,

    // -- Transaction params --
    /// Maximum transactions admitted into one block.
    pub max_tx_per_block: u32,
    /// Maximum `data` payload size on a transaction, bytes.
    pub max_tx_data_size: u64,
    /// Maximum number of pending transactions held for admission.
    pub max_mempool_size: u32,
    /// Maximum age, milliseconds, a pending transaction may reach before
    /// being dropped from the mempool.
    pub max_pending_tx_age_ms: u64,

    // -- Network params --
    /// Minimum peer count before a node leaves isolated mode.
    pub min_peers: u32,
    /// Peer liveness threshold, seconds.
    pub peer_heartbeat_timeout_secs: u64,

    // -- Security params --
    /// Peer-height gap above which upward sync begins.
    pub sync_gap_threshold: u64,
    /// Maximum forward clock skew tolerated for a non-syncing block,
    /// seconds.
    pub max_block_timestamp_drift_secs: u64,
    /// Blocks searched backward when looking for a common ancestor on a
    /// deep fork.
    pub deep_fork_search_depth: u64,

    // -- Storage params --
    /// Days of block history retained before whole-chunk pruning.
    pub retention_days: u64,
    /// Whether retention pruning runs automatically.
    pub auto_cleanup: bool,
    /// Floor below which pruning never drops blocks, regardless of
    /// `retention_days`.
    pub min_blocks_to_keep: u64,

    /// Reward halving thresholds, in descending-threshold order.
    pub reward_thresholds: Vec<RewardThreshold>,
}

impl ConsensusConfig {
    /// Canonical byte encoding of every field, in declaration order, used
    /// as the `consensus_hash` preimage. Implementations on other nodes
    /// must reproduce this exact ordering to remain compatible.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut b = ByteBuilder::new()
            .u16(self.version)
            .str(&self.chain_id)
            .u64(self.genesis_timestamp)
            .str(&self.unit_name)
            .u8(self.decimals)
            .u64(self.block_interval_ms)
            .u64(self.checkpoint_interval)
            .u64(self.max_block_size)
            .u8(self.data_threshold_percent)
            .u64(self.min_gas_fee)
            .u64(self.max_gas_fee)
            .u64(self.base_block_reward)
            .u64(self.min_reward_unit)
            .u64(self.validator_stake_required)
            .u32(self.max_validators)
            .u32(self.active_set_size)
            .u64(self.checkpoint_activation_buffer)
            .u32(self.max_tx_per_block)
            .u64(self.max_tx_data_size)
            .u32(self.max_mempool_size)
            .u64(self.max_pending_tx_age_ms)
            .u32(self.min_peers)
            .u64(self.peer_heartbeat_timeout_secs)
            .u64(self.sync_gap_threshold)
            .u64(self.max_block_timestamp_drift_secs)
            .u64(self.deep_fork_search_depth)
            .u64(self.retention_days)
            .bool(self.auto_cleanup)
            .u64(self.min_blocks_to_keep)
            .u32(self.reward_thresholds.len() as u32);
        for t in &self.reward_thresholds {
            b = b.u64(t.balance);
        }
        b.finish()
    }

    /// The network identifier peers exchange during the handshake. Two
    /// nodes with the same `consensus_hash` are guaranteed to compute
    /// identical proposer elections, validation outcomes, and reward
    /// amounts for identical inputs.
    pub fn consensus_hash(&self) -> Hash {
        sha3_256(&self.canonical_bytes())
    }
}

impl Default for ConsensusConfig {
    /// Reasonable defaults matching the end-to-end scenarios in §8.
    fn default() -> Self {
        Self {
            version: 1,
            chain_id: "quantum-chain-mainnet".to_string(),
            genesis_timestamp: 0,
            unit_name: "FAN".to_string(),
            decimals: 6,
            block_interval_ms: 5_000,
            checkpoint_interval: 100,
            max_block_size: 2_000_000,
            data_threshold_percent: 50,
            min_gas_fee: 1,
            max_gas_fee: 1_000_000,
            base_block_reward: 10_000_000,
            min_reward_unit: 1,
            validator_stake_required: 1_000_000,
            max_validators: 100,
            active_set_size: 21,
            checkpoint_activation_buffer: 12,
            max_tx_per_block: 5_000,
            max_tx_data_size: 1_024,
            max_mempool_size: 50_000,
            max_pending_tx_age_ms: 3_600_000,
            min_peers: 1,
            peer_heartbeat_timeout_secs: 90,
            sync_gap_threshold: 5,
            max_block_timestamp_drift_secs: 60,
            deep_fork_search_depth: 100,
            retention_days: 90,
            auto_cleanup: true,
            min_blocks_to_keep: 10_000,
            reward_thresholds: vec![
                RewardThreshold { balance: 1_200_000_000_000_000 },
                RewardThreshold { balance: 1_000_000_000_000_000 },
                RewardThreshold { balance: 800_000_000_000_000 },
            ],
        }
    }
}
