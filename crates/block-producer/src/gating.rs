//! The scheduler loop's pure decision points (§4.4 steps 1-5): the
//! activation gate, the block-interval wait, the elder-brother failover
//! rule, and the pre-production peer-height check.

/// Step 1: whether the loop must wait rather than attempt production at
/// all.
pub fn should_wait_for_gate(
    is_active_validator: bool,
    is_activated: bool,
    isolated: bool,
    is_genesis_validator: bool,
) -> bool {
    !is_active_validator || !is_activated || (isolated && !is_genesis_validator)
}

/// Step 2: whether enough time has passed since the head block to attempt
/// production of the next one.
pub fn ready_to_produce(now_ms: u64, head_timestamp_ms: u64, block_interval_ms: u64) -> bool {
    now_ms >= head_timestamp_ms + block_interval_ms
}

/// Step 4's outcome once the expected proposer for `H` is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposerDecision {
    /// This node is the expected proposer: produce now.
    Produce,
    /// Not yet waited long enough; check again later.
    KeepWaiting,
    /// The wait exceeded one interval, but a peer reports a height beyond
    /// `H`: defer to them rather than fork ("elder-brother rule").
    WaitForElderBrother,
    /// The wait exceeded one interval and no peer is ahead: produce in
    /// the expected proposer's place.
    Failover,
}

/// Decide what to do once the expected proposer for height `H` is known
/// and not equal to this node, given how long this node has already
/// waited for it. `failover_threshold_ms` is one block interval.
pub fn decide_proposer_action(
    expected_proposer_is_self: bool,
    wait_elapsed_ms: u64,
    failover_threshold_ms: u64,
    any_peer_height_exceeds_target: bool,
) -> ProposerDecision {
    if expected_proposer_is_self {
        return ProposerDecision::Produce;
    }
    if wait_elapsed_ms <= failover_threshold_ms {
        return ProposerDecision::KeepWaiting;
    }
    if any_peer_height_exceeds_target {
        ProposerDecision::WaitForElderBrother
    } else {
        ProposerDecision::Failover
    }
}

/// Step 5: the final peer-height check immediately before producing.
/// `target_height` is the height this node is about to produce (`H`).
pub fn should_sync_before_producing(best_peer_height: Option<u64>, target_height: u64) -> bool {
    matches!(best_peer_height, Some(peer_height) if peer_height > target_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_waits_when_not_an_active_validator() {
        assert!(should_wait_for_gate(false, true, false, true));
    }

    #[test]
    fn gate_waits_when_not_activated() {
        assert!(should_wait_for_gate(true, false, false, true));
    }

    #[test]
    fn gate_waits_while_isolated_and_not_a_genesis_validator() {
        assert!(should_wait_for_gate(true, true, true, false));
    }

    #[test]
    fn gate_permits_an_isolated_genesis_validator_to_proceed() {
        assert!(!should_wait_for_gate(true, true, true, true));
    }

    #[test]
    fn ready_to_produce_respects_the_block_interval() {
        assert!(!ready_to_produce(1_000, 0, 5_000));
        assert!(ready_to_produce(5_000, 0, 5_000));
    }

    #[test]
    fn produces_immediately_when_self_is_the_expected_proposer() {
        assert_eq!(decide_proposer_action(true, 0, 5_000, true), ProposerDecision::Produce);
    }

    #[test]
    fn keeps_waiting_within_one_interval() {
        assert_eq!(decide_proposer_action(false, 4_000, 5_000, false), ProposerDecision::KeepWaiting);
    }

    #[test]
    fn defers_to_an_elder_brother_peer_past_the_wait_threshold() {
        assert_eq!(
            decide_proposer_action(false, 6_000, 5_000, true),
            ProposerDecision::WaitForElderBrother
        );
    }

    #[test]
    fn fails_over_past_the_wait_threshold_with_no_peer_ahead() {
        assert_eq!(decide_proposer_action(false, 6_000, 5_000, false), ProposerDecision::Failover);
    }

    #[test]
    fn pre_production_check_catches_a_peer_ahead_of_the_target() {
        assert!(should_sync_before_producing(Some(101), 100));
        assert!(!should_sync_before_producing(Some(100), 100));
        assert!(!should_sync_before_producing(None, 100));
    }
}
