//! Checkpoint apply (§4.5 "Apply (receiver)"): the accept/no-op/drop
//! decision, authoritative validator-set reload, and placeholder-block
//! install for a block height the receiver hasn't fetched yet.

use consensus::ActiveValidatorSet;
use shared_types::block::PlaceholderBlock;
use shared_types::{Block, Checkpoint, Hash};

/// What a receiver should do with an incoming checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyDecision {
    /// Newer than anything locally known, or a fork at the locally
    /// anchored height: install it.
    Accept,
    /// Identical to what's already anchored: nothing to do.
    NoOp,
    /// Older than (or redundant with) what's already anchored: ignore.
    Drop,
}

/// Decide what to do with `incoming`, given the receiver's current chain
/// tip and anchored checkpoint.
pub fn decide(
    incoming_height: u64,
    incoming_hash: Hash,
    local_block_height: u64,
    local_checkpoint_height: u64,
    local_checkpoint_hash: Hash,
) -> ApplyDecision {
    if incoming_height > local_block_height {
        return ApplyDecision::Accept;
    }
    if incoming_height == local_checkpoint_height {
        return if incoming_hash != local_checkpoint_hash { ApplyDecision::Accept } else { ApplyDecision::NoOp };
    }
    // Strictly below the anchored height, or between the anchored height
    // and the current tip with no fork at the anchor: neither case moves
    // the receiver forward.
    ApplyDecision::Drop
}

/// The effect of accepting a checkpoint: the validator set to adopt
/// (authoritative, replacing whatever was active before) and, if the real
/// block at the checkpoint's height hasn't been fetched yet, the
/// placeholder to install in its place plus the height to request from
/// peers.
pub struct AcceptedCheckpoint {
    pub active_set: ActiveValidatorSet,
    pub placeholder: Option<Block>,
    pub needs_real_block_at: Option<u64>,
}

/// Apply an [`ApplyDecision::Accept`]. `locally_has_real_block` tells
/// whether the receiver already holds the real block at `checkpoint.height`
/// (fork-replacement and ordinary catch-up both count); when it doesn't, a
/// placeholder is produced whose `hash()` is the checkpoint's recorded
/// `block_hash`, so validation of `height + 1` can proceed without it.
pub fn apply_accepted(
    checkpoint: &Checkpoint,
    active_set_size: usize,
    locally_has_real_block: bool,
) -> AcceptedCheckpoint {
    let active_set = ActiveValidatorSet::from_checkpoint(
        checkpoint.validators.clone(),
        active_set_size,
        checkpoint.hash(),
    );
    let (placeholder, needs_real_block_at) = if locally_has_real_block {
        (None, None)
    } else {
        let placeholder = Block::Placeholder(PlaceholderBlock {
            height: checkpoint.height,
            hash: checkpoint.block_hash,
            timestamp: checkpoint.timestamp,
        });
        (Some(placeholder), Some(checkpoint.height))
    };
    AcceptedCheckpoint { active_set, placeholder, needs_real_block_at }
}

/// Whether installing `checkpoint` should move the chain head. Per §4.5,
/// the chain head never regresses: a checkpoint below the current real
/// block height only updates the anchored checkpoint bookkeeping, not the
/// tip.
pub fn should_advance_head(checkpoint_height: u64, local_block_height: u64) -> bool {
    checkpoint_height > local_block_height
}
