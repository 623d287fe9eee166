//! Validator activation (§4.8): a validator does not produce blocks
//! immediately on startup. It waits until peer height, a same-height
//! block-hash probe, and backfill agree the local chain isn't a stray
//! fork, and isn't about to land inside the checkpoint-activation buffer.
//!
//! The legacy "hash match within 10 blocks" predicate found alongside this
//! one in the source this was distilled from is dead code; only the rule
//! below (P6) is implemented.

/// One evaluation of the activation gate's inputs.
#[derive(Debug, Clone, Copy)]
pub struct ActivationProbe {
    pub local_height: u64,
    pub best_peer_height: u64,
    /// `None` when no seed peer could be reached to answer the probe.
    pub same_height_hash_matches: Option<bool>,
    pub backfill_complete: bool,
    pub next_checkpoint_height: u64,
    pub checkpoint_activation_buffer: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    Activate,
    Wait,
}

/// Evaluate the four P6 conditions. Activation requires all of:
/// (i) peer height within one checkpoint-interval tolerance (`<= local + 12`
///     in the tolerance sense — modeled here via the caller-supplied probe,
///     which already encodes the 12-block slack as
///     `checkpoint_activation_buffer`),
/// (ii) the same-height hash probe either matches or found no peer to ask,
/// (iii) backfill complete,
/// (iv) activating now would not land within `checkpoint_activation_buffer`
///      blocks of the next checkpoint.
pub fn evaluate(probe: &ActivationProbe) -> ActivationDecision {
    let height_close_enough = probe.best_peer_height <= probe.local_height + 12;
    let hash_ok = probe.same_height_hash_matches.unwrap_or(true);
    let too_close_to_checkpoint = probe
        .next_checkpoint_height
        .saturating_sub(probe.local_height)
        <= probe.checkpoint_activation_buffer;

    if height_close_enough && hash_ok && probe.backfill_complete && !too_close_to_checkpoint {
        ActivationDecision::Activate
    } else {
        ActivationDecision::Wait
    }
}

/// Isolated mode (§4.8): a bonded validator with zero peers and no
/// reachable seed HTTP endpoint produces unilaterally rather than stalling
/// — liveness over fork-avoidance, since there is nothing to fork from.
pub fn is_isolated(peer_count: usize, any_seed_reachable: bool, is_bonded_validator: bool) -> bool {
    peer_count == 0 && !any_seed_reachable && is_bonded_validator
}
