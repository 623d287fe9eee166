//! Checkpoint generation (§4.5 "Generation").
//!
//! Run at every height divisible by `checkpoint_interval`: gate on the P0
//! dual verifier, roll back to the highest earlier height that still
//! satisfies it if the gate fails, compute the state root and validator
//! snapshot, sign, and persist single-slot.

use crate::errors::CheckpointError;
use crate::scratch::ScratchLedger;
use shared_crypto::Signer;
use shared_types::hash::sha3_256;
use shared_types::{Account, Address, Block, Checkpoint, Hash, ValidatorSnapshot, TOTAL_SUPPLY};
use state_engine::{full_scan, AccountCache, NullValidatorSetObserver, SupplyTracker, TransactionExecutor};
use std::sync::Arc;

/// The outcome of a successful generation attempt: the block height the
/// checkpoint actually anchors (which may be lower than the requested
/// height if a rollback occurred), and the account set it was built over.
pub struct GenerationTarget {
    pub height: u64,
    pub accounts: Vec<Account>,
}

/// Check P0 at `requested_height`. If it already holds, return that height
/// and its accounts unchanged. Otherwise replay forward from the last
/// known-good checkpoint (`last_good_height`/`last_good_accounts`) and
/// scan backward, within `max_scan` blocks of `requested_height`, for the
/// highest height whose replayed state satisfies P0.
pub fn verify_or_rollback<B, S>(
    blocks: &B,
    requested_height: u64,
    requested_accounts: Vec<Account>,
    requested_tracker_total: u64,
    last_good_height: u64,
    last_good_accounts: Vec<Account>,
    max_scan: u64,
    validator_stake_required: u64,
    genesis: Address,
) -> Result<GenerationTarget, CheckpointError>
where
    B: state_engine::BlockSource,
    S: Signer,
{
    let full = full_scan(&requested_accounts);
    if requested_tracker_total == full && full == TOTAL_SUPPLY {
        return Ok(GenerationTarget { height: requested_height, accounts: requested_accounts });
    }

    tracing::warn!(
        requested_height,
        tracker = requested_tracker_total,
        full_scan = full,
        "supply invariant failed at checkpoint height, scanning backward"
    );

    let scratch = Arc::new(ScratchLedger::seeded(last_good_accounts.clone(), last_good_height));
    let mut cache = AccountCache::new(scratch);
    let tracker = SupplyTracker::new(full_scan(&last_good_accounts));
    let observer = NullValidatorSetObserver;

    let floor = requested_height.saturating_sub(max_scan).max(last_good_height);
    let mut history: Vec<(u64, Vec<Account>, u64)> = Vec::new();

    for height in (last_good_height + 1)..=requested_height {
        let block = blocks.read_block(height)?.ok_or(CheckpointError::MissingBlock(height))?;
        if let Block::Real(real) = &block {
            let mut executor =
                TransactionExecutor::new(&mut cache, &tracker, validator_stake_required, genesis.clone());
            for tx in &real.transactions {
                executor.execute::<S>(tx, &observer)?;
            }
        }
        cache.commit(height)?;
        if height >= floor {
            history.push((height, cache.merged_accounts()?, tracker.current()));
        }
    }

    for (height, accounts, total) in history.into_iter().rev().skip(1) {
        let full = full_scan(&accounts);
        if total == full && full == TOTAL_SUPPLY {
            return Ok(GenerationTarget { height, accounts });
        }
    }

    Err(CheckpointError::NoValidRollbackTarget { scanned_from: requested_height, max_scan })
}

/// Merkle root over every account's [`Account::merkle_leaf_preimage`],
/// sorted by address.
pub fn state_root(accounts: &[Account]) -> Hash {
    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));
    let leaves: Vec<Hash> = sorted.iter().map(|a| sha3_256(&a.merkle_leaf_preimage())).collect();
    shared_types::merkle::merkle_root(&leaves)
}

/// Select the validator snapshot: every account with `staked_balance ≥
/// min_stake`, sorted `(-stake, address)`, truncated to `max_validators`.
pub fn select_validators(accounts: &[Account], min_stake: u64, max_validators: u32) -> Vec<ValidatorSnapshot> {
    let mut candidates: Vec<&Account> = accounts.iter().filter(|a| a.staked_balance >= min_stake).collect();
    candidates.sort_by(|a, b| {
        b.staked_balance.cmp(&a.staked_balance).then_with(|| a.address.as_str().cmp(b.address.as_str()))
    });
    candidates.truncate(max_validators as usize);
    candidates
        .into_iter()
        .map(|a| ValidatorSnapshot { address: a.address.clone(), stake: a.staked_balance, vrf_pubkey: [0u8; 32] })
        .collect()
}

/// Build, sign, and return the checkpoint for `target`. `block_hash` and
/// `previous_hash` come from the block at `target.height` (and its
/// predecessor); `signer` is the producing validator's key.
#[allow(clippy::too_many_arguments)]
pub fn build_checkpoint<S: Signer>(
    target: &GenerationTarget,
    block_hash: Hash,
    previous_hash: Hash,
    timestamp: u64,
    proposer: Address,
    min_stake: u64,
    max_validators: u32,
    signer: &S,
) -> Checkpoint {
    let validators = select_validators(&target.accounts, min_stake, max_validators);
    let mut checkpoint = Checkpoint {
        height: target.height,
        block_hash,
        previous_hash,
        state_root: state_root(&target.accounts),
        timestamp,
        proposer,
        validators,
        signature: Vec::new(),
    };
    checkpoint.signature = signer.sign(&checkpoint.signing_bytes());
    checkpoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::testing::FakeSigner;
    use shared_types::block::{BlockHeader, RealBlock};
    use shared_types::hash::ZERO_HASH;
    use shared_types::NodeType;

    fn account(seed: &[u8], available: u64, staked: u64) -> Account {
        let mut a = Account::new(Address::derive(seed));
        a.available_balance = available;
        a.staked_balance = staked;
        a.node_type = NodeType::Validator;
        a
    }

    #[test]
    fn state_root_is_order_independent_of_input_vec() {
        let a = account(b"a", 10, 0);
        let b = account(b"b", 20, 0);
        let r1 = state_root(&[a.clone(), b.clone()]);
        let r2 = state_root(&[b, a]);
        assert_eq!(r1, r2);
    }

    #[test]
    fn select_validators_filters_sorts_and_truncates() {
        let accounts =
            vec![account(b"a", 0, 50), account(b"b", 0, 500), account(b"c", 0, 5), account(b"d", 0, 500)];
        let selected = select_validators(&accounts, 10, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].stake, 500);
        assert_eq!(selected[1].stake, 500);
        assert!(selected[0].address < selected[1].address);
    }

    #[test]
    fn no_rollback_needed_when_requested_height_already_satisfies_p0() {
        struct NoBlocks;
        impl state_engine::BlockSource for NoBlocks {
            fn read_block(&self, _h: u64) -> Result<Option<Block>, ledger_store::StorageError> {
                unreachable!("not needed on the happy path")
            }
        }
        let genesis = shared_types::address::genesis_address();
        let accounts = vec![{
            let mut a = Account::new(genesis.clone());
            a.available_balance = TOTAL_SUPPLY;
            a
        }];
        let target = verify_or_rollback::<_, FakeSigner>(
            &NoBlocks,
            10,
            accounts,
            TOTAL_SUPPLY,
            0,
            vec![],
            100,
            1_000_000,
            genesis,
        )
        .unwrap();
        assert_eq!(target.height, 10);
    }

    #[test]
    fn rolls_back_to_the_highest_earlier_height_that_still_satisfies_p0() {
        struct FakeBlocks {
            genesis: Address,
        }
        impl state_engine::BlockSource for FakeBlocks {
            fn read_block(&self, height: u64) -> Result<Option<Block>, ledger_store::StorageError> {
                let header = BlockHeader {
                    height,
                    previous_hash: ZERO_HASH,
                    timestamp: 1000 + height,
                    state_root: ZERO_HASH,
                    tx_root: ZERO_HASH,
                    proposer: self.genesis.clone(),
                    vrf_proof: vec![],
                    vrf_output: ZERO_HASH,
                    signature: vec![],
                };
                Ok(Some(Block::Real(RealBlock { header, transactions: vec![], data: None })))
            }
        }

        let genesis = shared_types::address::genesis_address();
        let mut genesis_account = Account::new(genesis.clone());
        genesis_account.available_balance = TOTAL_SUPPLY;
        let last_good_accounts = vec![genesis_account];

        let blocks = FakeBlocks { genesis: genesis.clone() };
        // The caller's own tracker disagrees with its own full scan at the
        // requested height (simulating a real desync bug in the live
        // store); every block this scan replays is itself balanced, so
        // the scan falls back to the height just below the one requested.
        let result = verify_or_rollback::<_, FakeSigner>(
            &blocks,
            3,
            vec![],
            TOTAL_SUPPLY + 1,
            0,
            last_good_accounts,
            100,
            1_000_000,
            genesis,
        )
        .unwrap();
        assert_eq!(result.height, 2);
    }
}
