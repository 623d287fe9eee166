//! The validator set used for proposer election, and the live validator
//! registry updated by stake/unstake mutation callbacks.

use shared_types::{Hash, ValidatorSnapshot};
use state_engine::ValidatorSetObserver;
use std::collections::HashSet;
use std::sync::RwLock;

/// The checkpoint-anchored validator set consensus draws proposers from.
/// Replaced wholesale on every checkpoint apply — never rebuilt from live
/// accounts mid-cycle, so every honest node computes the same proposer for
/// a given height.
#[derive(Clone, Debug, Default)]
pub struct ActiveValidatorSet {
    validators: Vec<ValidatorSnapshot>,
    active_set_size: usize,
    anchor_hash: Hash,
}

impl ActiveValidatorSet {
    /// Build from the full validator list recorded in the anchoring
    /// checkpoint (already truncated to `max_validators` there).
    pub fn from_checkpoint(
        validators: Vec<ValidatorSnapshot>,
        active_set_size: usize,
        anchor_hash: Hash,
    ) -> Self {
        ActiveValidatorSet { validators, active_set_size, anchor_hash }
    }

    /// The checkpoint hash this cycle's proposer draws are seeded from.
    pub fn anchor_hash(&self) -> Hash {
        self.anchor_hash
    }

    /// The active subset: at most `active_set_size`, sorted by
    /// `(-stake, address)`.
    pub fn active_by_stake(&self) -> Vec<&ValidatorSnapshot> {
        let mut v: Vec<&ValidatorSnapshot> = self.validators.iter().collect();
        v.sort_by(|a, b| b.stake.cmp(&a.stake).then_with(|| a.address.as_str().cmp(b.address.as_str())));
        v.truncate(self.active_set_size);
        v
    }

    /// The same active subset, re-sorted by address for the equal-
    /// probability proposer draw.
    pub fn active_by_address(&self) -> Vec<&ValidatorSnapshot> {
        let mut v = self.active_by_stake();
        v.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));
        v
    }

    /// Whether `address` is in the active subset.
    pub fn contains_active(&self, address: &str) -> bool {
        self.active_by_stake().iter().any(|v| v.address.as_str() == address)
    }

    /// Stake of `address` within the active subset, if present.
    pub fn stake_of(&self, address: &str) -> Option<u64> {
        self.active_by_stake().iter().find(|v| v.address.as_str() == address).map(|v| v.stake)
    }
}

/// The set of addresses currently known to be bonded validators, kept
/// current by [`ValidatorSetObserver`] callbacks fired synchronously from
/// state-engine's stake/unstake execution. Distinct from
/// [`ActiveValidatorSet`]: this registry reflects live stake, the active
/// set reflects the last checkpoint. Consulted by the validator-activation
/// gate and read APIs, never by proposer election.
pub struct LiveValidatorRegistry {
    members: RwLock<HashSet<String>>,
}

impl LiveValidatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        LiveValidatorRegistry { members: RwLock::new(HashSet::new()) }
    }

    /// Whether `address` is currently a live bonded validator.
    pub fn is_validator(&self, address: &str) -> bool {
        self.members.read().unwrap().contains(address)
    }

    /// Current member count.
    pub fn len(&self) -> usize {
        self.members.read().unwrap().len()
    }

    /// Whether the registry holds no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LiveValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorSetObserver for LiveValidatorRegistry {
    fn on_validator_added(&self, address: &str, staked: u64) {
        tracing::info!(address, staked, "validator bonded");
        self.members.write().unwrap().insert(address.to_string());
    }

    fn on_validator_removed(&self, address: &str) {
        tracing::info!(address, "validator unbonded");
        self.members.write().unwrap().remove(address);
    }
}
