//! The halving block-reward schedule.

use shared_types::RewardThreshold;

/// Compute the block reward given the genesis account's current available
/// balance. Non-increasing as `genesis_available` falls, floored at
/// `min_reward_unit` once any reward is due at all, and zero once genesis
/// is nearly exhausted.
pub fn block_reward(
    genesis_available: u64,
    base_reward: u64,
    min_reward_unit: u64,
    thresholds: &[RewardThreshold],
) -> u64 {
    const EXHAUSTED: u64 = 10_000_000_000_000; // 0.1 * 10^14
    const LOW: u64 = 20_000_000_000_000; // 0.2 * 10^14

    if genesis_available < EXHAUSTED {
        return 0;
    }
    if genesis_available < LOW {
        return min_reward_unit;
    }
    let k = thresholds.iter().filter(|t| genesis_available < t.balance).count() as u32;
    (base_reward >> k).max(min_reward_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Vec<RewardThreshold> {
        vec![
            RewardThreshold { balance: 1_000_000_000_000_000 },
            RewardThreshold { balance: 500_000_000_000_000 },
            RewardThreshold { balance: 100_000_000_000_000 },
        ]
    }

    #[test]
    fn zero_reward_below_exhaustion_threshold() {
        assert_eq!(block_reward(5_000_000_000_000, 10_000_000, 1, &thresholds()), 0);
    }

    #[test]
    fn floor_reward_in_the_low_band() {
        assert_eq!(block_reward(15_000_000_000_000, 10_000_000, 100, &thresholds()), 100);
    }

    #[test]
    fn halves_once_per_crossed_threshold() {
        // Below all three thresholds: k = 3.
        let reward = block_reward(50_000_000_000_000, 10_000_000, 1, &thresholds());
        assert_eq!(reward, 10_000_000 >> 3);
    }

    #[test]
    fn reward_floors_at_min_reward_unit() {
        let reward = block_reward(50_000_000_000_000, 4, 10, &thresholds());
        assert_eq!(reward, 10);
    }

    #[test]
    fn reward_is_non_increasing_as_balance_falls() {
        let mut prev = u64::MAX;
        for balance in (0..200_000_000_000_000u64).step_by(7_000_000_000_000).rev() {
            let r = block_reward(balance, 10_000_000, 1, &thresholds());
            assert!(r <= prev);
            prev = r;
        }
    }
}
