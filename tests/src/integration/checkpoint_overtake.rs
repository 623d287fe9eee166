//! Checkpoint-anchored forced resync: a peer's Ping reports a checkpoint at
//! the same anchored height as this node's, but with a different hash and
//! an earlier timestamp — the peer is the elder brother, and this node
//! must discard its own checkpoint/state files, roll back, and re-request
//! the chain above the peer's checkpoint.

use block_producer::produce_block;
use checkpoint::persistence::{delete_checkpoint_files, read_checkpoint, write_checkpoint};
use ledger_store::LedgerStore;
use p2p_sync::reorg::{decide_forced_resync, ForcedResyncDecision};
use shared_crypto::testing::{FakeSigner, FakeVrfProver};
use shared_types::block::PlaceholderBlock;
use shared_types::hash::{sha3_256, ZERO_HASH};
use shared_types::{Account, Address, Block, Checkpoint, TOTAL_SUPPLY};
use state_engine::{AccountCache, NullValidatorSetObserver, SupplyTracker};
use std::sync::Arc;

const VALIDATOR_STAKE_REQUIRED: u64 = 1_000_000;
const CHECKPOINT_INTERVAL: u64 = 100;
const REWARD_AMOUNT: u64 = 10;
const ANCHOR_HEIGHT: u64 = 500;

fn local_checkpoint(proposer: Address) -> Checkpoint {
    Checkpoint {
        height: ANCHOR_HEIGHT,
        block_hash: ZERO_HASH,
        previous_hash: ZERO_HASH,
        state_root: ZERO_HASH,
        timestamp: 10_000,
        proposer,
        validators: vec![],
        signature: vec![],
    }
}

#[test]
fn forced_resync_discards_local_checkpoint_and_rolls_back_to_the_peers_anchor() {
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
    let proposer = Address::derive(b"proposer");

    let mut prev = Block::Placeholder(PlaceholderBlock { height: 0, hash: ZERO_HASH, timestamp: 0 });
    for height in 1..=ANCHOR_HEIGHT {
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
    assert_eq!(ledger.latest_height().unwrap(), Some(ANCHOR_HEIGHT));

    let local = local_checkpoint(proposer.clone());
    write_checkpoint(dir.path(), &local).unwrap();
    assert!(read_checkpoint(dir.path()).unwrap().is_some());

    // A peer's Ping reports a checkpoint at the same anchored height, with a
    // different hash and an earlier (elder-brother) timestamp.
    let peer_checkpoint_hash = sha3_256(b"peer-fork");
    let known_highest_checkpoint_height = ANCHOR_HEIGHT;
    let decision = decide_forced_resync(
        local.height,
        local.hash(),
        local.timestamp,
        ANCHOR_HEIGHT,
        peer_checkpoint_hash,
        5_000,
        known_highest_checkpoint_height,
        CHECKPOINT_INTERVAL,
    );
    assert_eq!(decision, ForcedResyncDecision::Resync { rollback_to: 400, request_to: 1500 });

    let ForcedResyncDecision::Resync { rollback_to, request_to } = decision else {
        unreachable!()
    };

    delete_checkpoint_files(dir.path()).unwrap();
    ledger.rollback_to(rollback_to, ANCHOR_HEIGHT).unwrap();

    assert!(read_checkpoint(dir.path()).unwrap().is_none());
    assert_eq!(ledger.latest_height().unwrap(), Some(rollback_to));
    assert_eq!(rollback_to, ANCHOR_HEIGHT - CHECKPOINT_INTERVAL);
    assert_eq!(request_to, ANCHOR_HEIGHT + 1_000);
}
