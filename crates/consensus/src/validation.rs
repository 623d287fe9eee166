//! Block validation against a parent block and the active validator set.
//!
//! Any failure here rejects the one block under consideration; it never
//! aborts the chain. The parent is skipped for the `previous_hash` check
//! when it is a checkpoint-installed placeholder, since its real hash is
//! not yet known.

use crate::errors::ConsensusError;
use crate::validator::ActiveValidatorSet;
use shared_types::{Block, RealBlock};

/// Default maximum allowed drift between a block's timestamp and wall
/// clock, when not synchronizing.
pub const MAX_FUTURE_DRIFT_SECS: u64 = 60;

/// Validate `candidate` against its parent `prev` and the active set.
/// `now_ms` and `syncing` gate the future-timestamp check (skipped while
/// catching up, since historical blocks are being replayed). `min_gas_fee`,
/// `max_gas_fee`, and `max_data_size` are the structural bounds each
/// transaction is checked against — a block received from a peer never went
/// through this node's own admission, so this is the only place those
/// bounds are enforced on it.
#[allow(clippy::too_many_arguments)]
pub fn validate_block(
    prev: &Block,
    candidate: &RealBlock,
    active_set: &ActiveValidatorSet,
    now_ms: u64,
    syncing: bool,
    max_future_drift_secs: u64,
    min_gas_fee: u64,
    max_gas_fee: u64,
    max_data_size: usize,
) -> Result<(), ConsensusError> {
    let expected_height = prev.height() + 1;
    if candidate.header.height != expected_height {
        return Err(ConsensusError::HeightMismatch {
            expected: expected_height,
            actual: candidate.header.height,
        });
    }

    if !prev.is_placeholder() && candidate.header.previous_hash != prev.hash() {
        return Err(ConsensusError::InvalidPreviousHash);
    }

    if candidate.header.timestamp <= prev.timestamp() {
        return Err(ConsensusError::TimestampNotIncreasing {
            parent: prev.timestamp(),
            block: candidate.header.timestamp,
        });
    }
    if !syncing {
        let max_allowed = now_ms + max_future_drift_secs * 1000;
        if candidate.header.timestamp > max_allowed {
            return Err(ConsensusError::TimestampTooFarAhead {
                block: candidate.header.timestamp,
                now: now_ms,
            });
        }
    }

    if !candidate.tx_root_matches() {
        return Err(ConsensusError::TxRootMismatch);
    }

    for tx in &candidate.transactions {
        tx.validate_structure(min_gas_fee, max_gas_fee, max_data_size)?;
    }

    if !active_set.contains_active(candidate.header.proposer.as_str()) {
        return Err(ConsensusError::ProposerNotActive(candidate.header.proposer.as_str().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::block::{BlockHeader, PlaceholderBlock};
    use shared_types::hash::{sha3_256, ZERO_HASH};
    use shared_types::{Address, ValidatorSnapshot};

    fn active_set_with(proposer: Address) -> ActiveValidatorSet {
        ActiveValidatorSet::from_checkpoint(
            vec![ValidatorSnapshot { address: proposer, stake: 1000, vrf_pubkey: [0u8; 32] }],
            10,
            ZERO_HASH,
        )
    }

    fn header(height: u64, previous_hash: shared_types::Hash, timestamp: u64, proposer: Address) -> BlockHeader {
        BlockHeader {
            height,
            previous_hash,
            timestamp,
            state_root: ZERO_HASH,
            tx_root: shared_types::merkle::merkle_root(&[]),
            proposer,
            vrf_proof: vec![],
            vrf_output: ZERO_HASH,
            signature: vec![],
        }
    }

    #[test]
    fn rejects_height_mismatch() {
        let prev = Block::Real(RealBlock {
            header: header(5, ZERO_HASH, 100, Address::derive(b"p")),
            transactions: vec![],
            data: None,
        });
        let proposer = Address::derive(b"p2");
        let candidate = RealBlock {
            header: header(10, prev.hash(), 200, proposer.clone()),
            transactions: vec![],
            data: None,
        };
        let active = active_set_with(proposer);
        assert!(matches!(
            validate_block(&prev, &candidate, &active, 1_000_000, false, 60, 0, u64::MAX, usize::MAX),
            Err(ConsensusError::HeightMismatch { .. })
        ));
    }

    #[test]
    fn skips_previous_hash_check_for_placeholder_parent() {
        let prev = Block::Placeholder(PlaceholderBlock { height: 5, hash: sha3_256(b"ckpt"), timestamp: 100 });
        let proposer = Address::derive(b"p");
        let candidate = RealBlock {
            header: header(6, sha3_256(b"anything"), 200, proposer.clone()),
            transactions: vec![],
            data: None,
        };
        let active = active_set_with(proposer);
        assert!(validate_block(&prev, &candidate, &active, 1_000_000, false, 60, 0, u64::MAX, usize::MAX).is_ok());
    }

    #[test]
    fn rejects_proposer_outside_active_set() {
        let proposer = Address::derive(b"p");
        let prev = Block::Real(RealBlock {
            header: header(1, ZERO_HASH, 100, proposer.clone()),
            transactions: vec![],
            data: None,
        });
        let candidate = RealBlock {
            header: header(2, prev.hash(), 200, Address::derive(b"not-active")),
            transactions: vec![],
            data: None,
        };
        let active = active_set_with(proposer);
        assert!(matches!(
            validate_block(&prev, &candidate, &active, 1_000_000, false, 60, 0, u64::MAX, usize::MAX),
            Err(ConsensusError::ProposerNotActive(_))
        ));
    }
}
