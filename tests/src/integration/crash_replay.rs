//! Crash-recovery replay against real `ledger-store` I/O: a block is
//! written to the chain store but the node is killed before the matching
//! account-state commit lands. Restart must detect the gap via
//! `state_height` vs. `block_height` and replay exactly the missing block.

use block_producer::{assembly, produce_block};
use ledger_store::LedgerStore;
use shared_crypto::testing::{FakeSigner, FakeVrfProver};
use shared_types::block::PlaceholderBlock;
use shared_types::hash::ZERO_HASH;
use shared_types::{Account, Address, Block, TOTAL_SUPPLY};
use state_engine::{plan_recovery, replay, supply::full_scan, AccountCache, NullValidatorSetObserver, ReplayPlan, SupplyTracker};
use std::sync::Arc;

const VALIDATOR_STAKE_REQUIRED: u64 = 1_000_000;
const CHECKPOINT_INTERVAL: u64 = 100;
const REWARD_AMOUNT: u64 = 10;

#[test]
fn replay_catches_up_a_block_written_without_its_state_commit() {
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
    let signer = FakeSigner::new(b"proposer-key".to_vec());
    let vrf = FakeVrfProver::new(b"proposer-key".to_vec());
    let proposer = Address::derive(b"proposer");

    let mut prev = Block::Placeholder(PlaceholderBlock { height: 0, hash: ZERO_HASH, timestamp: 0 });
    for height in 1..=99u64 {
        let produced = produce_block(
            &ledger,
            &mut cache,
            &tracker,
            &observer,
            VALIDATOR_STAKE_REQUIRED,
            genesis.clone(),
            CHECKPOINT_INTERVAL,
            &prev,
            proposer.clone(),
            height * 1000,
            vec![],
            REWARD_AMOUNT,
            &signer,
            &vrf,
        )
        .unwrap();
        prev = Block::Real(produced.block);
    }
    assert_eq!(ledger.state_height().unwrap(), 99);

    // Block 100 lands in the chain store, but the process is killed before
    // the matching `cache.commit(100)` that should follow it: execute the
    // reward transaction in-memory to derive the state root, append the
    // block, and then simply never commit.
    let mut executor = state_engine::TransactionExecutor::new(&mut cache, &tracker, VALIDATOR_STAKE_REQUIRED, genesis.clone());
    let reward = assembly::reward_transaction(genesis.clone(), proposer.clone(), REWARD_AMOUNT, 100_000);
    executor.execute::<FakeSigner>(&reward, &observer).unwrap();
    let state_root = checkpoint::generation::state_root(&cache.merged_accounts().unwrap());

    let mut block_100 = assembly::assemble(&prev, proposer.clone(), 100_000, vec![reward], state_root, &vrf);
    assembly::sign(&mut block_100, &signer);
    ledger.append_block(100, &Block::Real(block_100)).unwrap();

    assert_eq!(ledger.state_height().unwrap(), 99);
    assert_eq!(ledger.latest_height().unwrap(), Some(100));

    let plan = plan_recovery(ledger.latest_height().unwrap().unwrap(), ledger.state_height().unwrap());
    assert_eq!(plan, ReplayPlan::Replay { from: 100, to: 100 });

    let mut recovery_cache = AccountCache::new(ledger.clone());
    if let ReplayPlan::Replay { from, to } = plan {
        replay::<LedgerStore, LedgerStore, FakeSigner>(
            &mut recovery_cache,
            &tracker,
            ledger.as_ref(),
            &observer,
            VALIDATOR_STAKE_REQUIRED,
            genesis.clone(),
            from,
            to,
        )
        .unwrap();
    } else {
        panic!("expected a replay plan");
    }

    assert_eq!(ledger.state_height().unwrap(), 100);
    let accounts = ledger.all_accounts().unwrap();
    assert_eq!(full_scan(&accounts), TOTAL_SUPPLY);
}
