//! Deterministic, cycle-stable proposer election.
//!
//! Every proposer for a whole checkpoint cycle is fixed the moment the
//! anchoring checkpoint is committed: the election seed depends only on
//! the anchor hash and the cycle's start/offset, not on anything computed
//! at block-production time.

use crate::errors::ConsensusError;
use shared_types::canonical::ByteBuilder;
use shared_types::hash::sha3_256;
use shared_types::{Address, ValidatorSnapshot};

/// `(cycle_start, cycle_offset)` for `height` within cycles of
/// `cycle_size` blocks. Height 0 is defined to have offset 0.
pub fn cycle_position(height: u64, cycle_size: u64) -> (u64, u64) {
    if height == 0 {
        return (0, 0);
    }
    let cycle_offset = (height - 1) % cycle_size;
    let cycle_start = height - cycle_offset;
    (cycle_start, cycle_offset)
}

/// Elect the proposer for `height`, given the active set sorted by
/// address and the anchor checkpoint hash. A pure function of its inputs.
pub fn elect(
    active_sorted_by_address: &[&ValidatorSnapshot],
    anchor_hash: shared_types::Hash,
    height: u64,
    cycle_size: u64,
) -> Result<Address, ConsensusError> {
    if active_sorted_by_address.is_empty() {
        return Err(ConsensusError::EmptyActiveSet);
    }
    let (cycle_start, cycle_offset) = cycle_position(height, cycle_size);
    let seed = ByteBuilder::new()
        .bytes(&anchor_hash)
        .u64(cycle_start)
        .u64(cycle_offset)
        .finish();
    let digest = sha3_256(&seed);
    let idx_seed = u64::from_be_bytes(digest[0..8].try_into().unwrap());
    let idx = (idx_seed % active_sorted_by_address.len() as u64) as usize;
    Ok(active_sorted_by_address[idx].address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::hash::ZERO_HASH;

    fn set(seeds: &[&[u8]]) -> Vec<ValidatorSnapshot> {
        seeds
            .iter()
            .map(|s| ValidatorSnapshot { address: Address::derive(s), stake: 100, vrf_pubkey: [0u8; 32] })
            .collect()
    }

    #[test]
    fn cycle_position_handles_height_zero() {
        assert_eq!(cycle_position(0, 100), (0, 0));
    }

    #[test]
    fn cycle_position_wraps_within_a_cycle() {
        assert_eq!(cycle_position(1, 100), (1, 0));
        assert_eq!(cycle_position(100, 100), (1, 99));
        assert_eq!(cycle_position(101, 100), (101, 0));
    }

    #[test]
    fn election_is_deterministic_across_calls() {
        let validators = set(&[b"a", b"b", b"c"]);
        let mut refs: Vec<&ValidatorSnapshot> = validators.iter().collect();
        refs.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));

        let p1 = elect(&refs, sha3_256(b"anchor"), 42, 100).unwrap();
        let p2 = elect(&refs, sha3_256(b"anchor"), 42, 100).unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn election_changes_across_a_cycle_boundary_seed() {
        let validators = set(&[b"a", b"b", b"c", b"d", b"e"]);
        let mut refs: Vec<&ValidatorSnapshot> = validators.iter().collect();
        refs.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));

        let proposers: Vec<Address> = (1..=5)
            .map(|h| elect(&refs, ZERO_HASH, h, 100).unwrap())
            .collect();
        // Not asserting any particular distribution, only that the
        // election function does not degenerate to a constant for a
        // varying cycle_offset with a fixed cycle_start.
        assert!(proposers.iter().any(|p| p != &proposers[0]));
    }

    #[test]
    fn empty_active_set_is_an_error() {
        assert!(elect(&[], ZERO_HASH, 1, 100).is_err());
    }
}
