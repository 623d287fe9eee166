//! Reorganization and fork resolution (§4.7): proposer-mismatch reorg,
//! deep-fork common-ancestor search, stake-weighted tie-break, and
//! checkpoint-anchored forced resync.

use shared_types::{Address, Hash};
use std::cmp::Ordering;

/// The outcome of detecting a proposer-mismatch reorg trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorgOutcome {
    /// Roll back to `rollback_to` (= `H - 1`), reload state there, delete
    /// blocks above it, then apply the correct block.
    SimpleReorg { rollback_to: u64 },
    /// The expected `previous_hash` already diverges at `H - 1`: request
    /// `[search_from, search_to]` from the winning peer to find the
    /// common ancestor.
    DeepFork { search_from: u64, search_to: u64 },
}

/// Detect a proposer-mismatch reorg trigger for the block at `height`.
/// Returns `None` when the local proposer already matches the VRF
/// expectation (nothing to do) or the competing chain's proposer doesn't
/// match it either (handled by [`tie_break`] instead, not a reorg).
pub fn detect(
    local_proposer_matches_expected: bool,
    competing_proposer_matches_expected: bool,
    prev_hash_diverges_at_height_minus_one: bool,
    height: u64,
    deep_fork_search_depth: u64,
) -> Option<ReorgOutcome> {
    if local_proposer_matches_expected || !competing_proposer_matches_expected {
        return None;
    }
    let h_minus_1 = height.saturating_sub(1);
    if prev_hash_diverges_at_height_minus_one {
        Some(ReorgOutcome::DeepFork {
            search_from: h_minus_1.saturating_sub(deep_fork_search_depth),
            search_to: h_minus_1,
        })
    } else {
        Some(ReorgOutcome::SimpleReorg { rollback_to: h_minus_1 })
    }
}

/// Break a tie between two competing proposers, neither of which matches
/// the VRF expectation: larger stake wins, equal stake falls back to
/// lexicographic address comparison.
pub fn tie_break(a: &Address, a_stake: u64, b: &Address, b_stake: u64) -> Address {
    match a_stake.cmp(&b_stake) {
        Ordering::Greater => a.clone(),
        Ordering::Less => b.clone(),
        Ordering::Equal => {
            if a.as_str() <= b.as_str() {
                a.clone()
            } else {
                b.clone()
            }
        }
    }
}

/// What to do about a peer's checkpoint that forks from the local one at
/// the same anchored height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedResyncDecision {
    /// The peer is the elder brother: delete local checkpoint files, roll
    /// back to `rollback_to`, reload state, and request
    /// `[rollback_to + 1, request_to]`.
    Resync { rollback_to: u64, request_to: u64 },
    /// Not applicable, or the peer is not the real elder brother.
    Ignore,
}

/// Decide whether to perform a checkpoint-anchored forced resync against a
/// peer whose Ping/Pong reports a different checkpoint hash at the same
/// height this node has anchored.
#[allow(clippy::too_many_arguments)]
pub fn decide_forced_resync(
    local_checkpoint_height: u64,
    local_checkpoint_hash: Hash,
    local_checkpoint_timestamp: u64,
    peer_checkpoint_height: u64,
    peer_checkpoint_hash: Hash,
    peer_checkpoint_timestamp: u64,
    known_highest_checkpoint_height: u64,
    checkpoint_interval: u64,
) -> ForcedResyncDecision {
    if peer_checkpoint_height != local_checkpoint_height || peer_checkpoint_hash == local_checkpoint_hash {
        return ForcedResyncDecision::Ignore;
    }
    // Never follow a peer whose checkpoint is below the highest one ever
    // observed: that peer cannot be the real elder brother.
    if peer_checkpoint_height < known_highest_checkpoint_height {
        return ForcedResyncDecision::Ignore;
    }
    // Elder brother = earlier timestamp. The peer only wins a strictly
    // earlier one.
    if peer_checkpoint_timestamp >= local_checkpoint_timestamp {
        return ForcedResyncDecision::Ignore;
    }
    let rollback_to = peer_checkpoint_height.saturating_sub(checkpoint_interval).max(1);
    ForcedResyncDecision::Resync { rollback_to, request_to: peer_checkpoint_height + 1000 }
}
