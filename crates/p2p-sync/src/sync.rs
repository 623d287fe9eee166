//! Upward sync (tip catch-up) and downward sync (checkpoint backfill), as
//! pure decision functions over heights and hashes. The actual batch
//! request/apply loop (owned by `node-runtime`) calls these to decide what
//! to request next and how to classify each block it receives.

use shared_types::Hash;

/// Whether a peer reporting `peer_height` is far enough ahead of
/// `local_height` to trigger upward sync.
pub fn should_start_upward_sync(peer_height: u64, local_height: u64, gap_threshold: u64) -> bool {
    peer_height > local_height + gap_threshold
}

/// The next batch range to request, `[local_height + 1, min(local_height +
/// batch_size, target)]`.
pub fn next_upward_batch(local_height: u64, target: u64, batch_size: u64) -> (u64, u64) {
    let from = local_height + 1;
    let to = (local_height + batch_size).min(target);
    (from, to)
}

/// How one block in a received sync batch should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDisposition {
    /// Strictly above the local head and within the requested range:
    /// apply it normally.
    Accept,
    /// At or below the local head, with a hash differing from what's
    /// already stored there: the elder-brother peer's version overwrites
    /// the local one verbatim. No reorg machinery needed — the state at
    /// this height is reconstructed by later reorg or replay.
    ForkReplacement,
    /// Outside the requested range, or identical to what's already
    /// stored: nothing to do.
    Ignore,
}

/// Classify one offered block against the local chain. `local_hash_at_height`
/// is `None` when the local chain has no block at `height` yet.
pub fn classify(
    height: u64,
    incoming_hash: Hash,
    local_head: u64,
    local_hash_at_height: Option<Hash>,
    requested_from: u64,
    requested_to: u64,
) -> BlockDisposition {
    if height <= local_head {
        return match local_hash_at_height {
            Some(local_hash) if local_hash != incoming_hash => BlockDisposition::ForkReplacement,
            _ => BlockDisposition::Ignore,
        };
    }
    if height >= requested_from && height <= requested_to {
        BlockDisposition::Accept
    } else {
        BlockDisposition::Ignore
    }
}

/// First-failure diagnosis for a batch apply, deciding what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyFailure {
    /// `invalid previous hash` or a proposer mismatch: attempt a reorg.
    AttemptReorg,
    /// `invalid height`: the middle of the range is missing; request it.
    RequestMissingRange,
}

/// The downward (backfill) batch range: from `checkpoint_height - 1`
/// downward, capped at `batch_size` blocks and never below
/// `earliest_peer_height`.
pub fn next_backfill_batch(cursor: u64, earliest_peer_height: u64, batch_size: u64) -> (u64, u64) {
    let to = cursor;
    let from = to.saturating_sub(batch_size.saturating_sub(1)).max(earliest_peer_height);
    (from, to)
}

/// Whether backfill has reached the peer's earliest known block — the P4
/// gate a validator must clear before resuming block production.
pub fn backfill_complete(earliest_written_height: u64, earliest_peer_height: u64) -> bool {
    earliest_written_height <= earliest_peer_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::hash::{sha3_256, ZERO_HASH};

    #[test]
    fn upward_sync_triggers_only_beyond_the_gap_threshold() {
        assert!(!should_start_upward_sync(105, 100, 5));
        assert!(should_start_upward_sync(106, 100, 5));
    }

    #[test]
    fn next_upward_batch_caps_at_target() {
        assert_eq!(next_upward_batch(100, 103, 50), (101, 103));
        assert_eq!(next_upward_batch(100, 500, 50), (101, 150));
    }

    #[test]
    fn classify_accepts_within_requested_range() {
        let disposition = classify(105, sha3_256(b"x"), 100, None, 101, 150);
        assert_eq!(disposition, BlockDisposition::Accept);
    }

    #[test]
    fn classify_flags_fork_replacement_below_local_head() {
        let local_hash = sha3_256(b"local");
        let disposition = classify(90, sha3_256(b"peer-version"), 100, Some(local_hash), 101, 150);
        assert_eq!(disposition, BlockDisposition::ForkReplacement);
    }

    #[test]
    fn classify_ignores_identical_blocks_below_local_head() {
        let hash = sha3_256(b"same");
        let disposition = classify(90, hash, 100, Some(hash), 101, 150);
        assert_eq!(disposition, BlockDisposition::Ignore);
    }

    #[test]
    fn classify_ignores_heights_outside_the_requested_range() {
        let disposition = classify(200, ZERO_HASH, 100, None, 101, 150);
        assert_eq!(disposition, BlockDisposition::Ignore);
    }

    #[test]
    fn backfill_batch_never_goes_below_the_peers_earliest_height() {
        assert_eq!(next_backfill_batch(50, 30, 100), (30, 50));
        assert_eq!(next_backfill_batch(150, 30, 50), (101, 150));
    }

    #[test]
    fn backfill_completes_once_written_height_reaches_peer_floor() {
        assert!(!backfill_complete(40, 30));
        assert!(backfill_complete(30, 30));
        assert!(backfill_complete(20, 30));
    }
}
