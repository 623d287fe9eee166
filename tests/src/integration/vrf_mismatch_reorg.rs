//! A proposer-mismatch reorg: this node produces a block from the wrong
//! proposer, a peer's competing block matches the VRF expectation instead,
//! and the node must roll back to the parent height, discard its own
//! block and state, and re-adopt the peer's.

use block_producer::produce_block;
use ledger_store::LedgerStore;
use p2p_sync::reorg::{detect, ReorgOutcome};
use shared_crypto::testing::{FakeSigner, FakeVrfProver};
use shared_types::block::PlaceholderBlock;
use shared_types::hash::ZERO_HASH;
use shared_types::{Account, Address, Block, TOTAL_SUPPLY};
use state_engine::{full_scan, AccountCache, NullValidatorSetObserver, SupplyTracker};
use std::sync::Arc;

const VALIDATOR_STAKE_REQUIRED: u64 = 1_000_000;
const CHECKPOINT_INTERVAL: u64 = 100;
const REWARD_AMOUNT: u64 = 10;
const DEEP_FORK_SEARCH_DEPTH: u64 = 50;

#[test]
fn reorg_discards_the_wrong_proposers_block_and_adopts_the_correct_one() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(LedgerStore::open(dir.path()).unwrap());

    let genesis = shared_types::address::genesis_address().clone();
    let mut genesis_account = Account::new(genesis.clone());
    genesis_account.available_balance = TOTAL_SUPPLY;
    ledger.commit_accounts(&[genesis_account], 0).unwrap();
    ledger
        .append_block(0, &Block::Placeholder(PlaceholderBlock { height: 0, hash: ZERO_HASH, timestamp: 0 }))
        .unwrap();

    let mut cache = AccountCache::new(ledger.clone());
    let tracker = SupplyTracker::new(TOTAL_SUPPLY);
    let observer = NullValidatorSetObserver;
    let signer = FakeSigner::new(b"shared-key".to_vec());
    let vrf = FakeVrfProver::new(b"shared-key".to_vec());

    let wrong_proposer = Address::derive(b"wrong-proposer");
    let correct_proposer = Address::derive(b"correct-proposer");

    let mut prev = Block::Placeholder(PlaceholderBlock { height: 0, hash: ZERO_HASH, timestamp: 0 });
    for height in 1..=4u64 {
        let produced = produce_block(
            &ledger,
            &mut cache,
            &tracker,
            &observer,
            VALIDATOR_STAKE_REQUIRED,
            genesis.clone(),
            CHECKPOINT_INTERVAL,
            &prev,
            correct_proposer.clone(),
            height * 1000,
            vec![],
            REWARD_AMOUNT,
            &signer,
            &vrf,
        )
        .unwrap();
        prev = Block::Real(produced.block);
    }

    // Snapshot the durable state at height 4 so it can be restored once the
    // wrong block at height 5 is discarded.
    let accounts_at_height_4 = ledger.all_accounts().unwrap();

    // This node produces height 5 itself, from the wrong proposer.
    produce_block(
        &ledger,
        &mut cache,
        &tracker,
        &observer,
        VALIDATOR_STAKE_REQUIRED,
        genesis.clone(),
        CHECKPOINT_INTERVAL,
        &prev,
        wrong_proposer.clone(),
        5_000,
        vec![],
        REWARD_AMOUNT,
        &signer,
        &vrf,
    )
    .unwrap();
    assert_eq!(ledger.latest_height().unwrap(), Some(5));

    // A peer's Ping reports a competing block at height 5 whose proposer
    // does match the VRF expectation, and `previous_hash` does not diverge
    // below height 5 — a simple reorg, not a deep fork.
    let outcome = detect(false, true, false, 5, DEEP_FORK_SEARCH_DEPTH);
    assert_eq!(outcome, Some(ReorgOutcome::SimpleReorg { rollback_to: 4 }));
    let ReorgOutcome::SimpleReorg { rollback_to } = outcome.unwrap() else {
        unreachable!()
    };

    ledger.rollback_to(rollback_to, 5).unwrap();
    ledger.replace_all_accounts(&accounts_at_height_4, rollback_to).unwrap();
    assert_eq!(ledger.latest_height().unwrap(), Some(4));
    assert_eq!(ledger.state_height().unwrap(), 4);

    // Re-derive from a fresh cache, since the reverted node's in-memory
    // cache still holds the discarded wrong-proposer block's dirty set.
    let mut cache = AccountCache::new(ledger.clone());
    let tracker = SupplyTracker::new(TOTAL_SUPPLY);
    let produced = produce_block(
        &ledger,
        &mut cache,
        &tracker,
        &observer,
        VALIDATOR_STAKE_REQUIRED,
        genesis.clone(),
        CHECKPOINT_INTERVAL,
        &prev,
        correct_proposer.clone(),
        5_000,
        vec![],
        REWARD_AMOUNT,
        &signer,
        &vrf,
    )
    .unwrap();

    assert_eq!(produced.block.header.height, 5);
    assert_eq!(produced.block.header.proposer, correct_proposer);
    assert_eq!(ledger.latest_height().unwrap(), Some(5));
    assert_eq!(ledger.state_height().unwrap(), 5);
    assert_eq!(full_scan(&ledger.all_accounts().unwrap()), TOTAL_SUPPLY);
}
