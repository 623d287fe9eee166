//! The composition root: direct construction and field injection of every
//! subsystem crate, with no global registry and no event bus (§9 "Cyclic
//! component wiring" — interface-based handles, injected at construction).

use crate::errors::RuntimeError;
use crate::{activation, config::NodeConfig, recovery};
use block_producer::{dedupe_and_admit, AccountView};
use checkpoint::GenerationTarget;
use consensus::{ActiveValidatorSet, LiveValidatorRegistry};
use ledger_store::LedgerStore;
use p2p_sync::{Handshake, PeerRegistry};
use shared_crypto::{Signer, VrfProver};
use shared_types::{Account, Address, Block, ConsensusConfig, Transaction, TOTAL_SUPPLY};
use state_engine::{full_scan, AccountCache, SupplyTracker, ValidatorSetObserver};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Everything the producer loop and the P2P accept loop share: the chain
/// store, account cache, supply tracker, the checkpoint-anchored active
/// set, the live validator registry, and the peer registry. One instance
/// per running node.
pub struct Node<S: Signer, V: VrfProver> {
    pub node_config: NodeConfig,
    pub consensus_config: Arc<ConsensusConfig>,
    pub ledger: Arc<LedgerStore>,
    pub cache: parking_lot::Mutex<AccountCache<LedgerStore>>,
    pub tracker: Arc<SupplyTracker>,
    pub active_set: parking_lot::RwLock<ActiveValidatorSet>,
    pub live_registry: Arc<LiveValidatorRegistry>,
    pub peer_registry: Arc<PeerRegistry>,
    pub chain_head: parking_lot::RwLock<Block>,
    pub activated: AtomicBool,
    /// `(height, first_observed_ms)` for the height this node is currently
    /// waiting on the expected proposer for — reset whenever `height`
    /// changes, consulted to compute `wait_elapsed_ms` for
    /// [`block_producer::decide_proposer_action`].
    wait_started: parking_lot::Mutex<Option<(u64, u64)>>,
    signer: S,
    vrf: V,
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64
}

impl<S: Signer, V: VrfProver> Node<S, V> {
    /// Open the ledger store under `node_config.data_dir`, bootstrap a
    /// fresh genesis account if the store is empty, run crash recovery,
    /// and rebuild the live validator registry from the recovered account
    /// set.
    pub fn new(node_config: NodeConfig, consensus_config: ConsensusConfig, signer: S, vrf: V) -> Result<Self, RuntimeError> {
        let ledger = Arc::new(LedgerStore::open(&node_config.data_dir)?);
        let genesis = shared_types::address::genesis_address().clone();

        if ledger.latest_height()?.is_none() {
            bootstrap_genesis(&ledger, genesis.clone(), &consensus_config)?;
        }

        let mut cache = AccountCache::new(ledger.clone());
        let live_registry = Arc::new(LiveValidatorRegistry::new());

        recovery::recover::<S>(
            &ledger,
            &mut cache,
            &SupplyTracker::new(full_scan(&ledger.all_accounts()?)),
            &recovery::silent_observer(),
            consensus_config.validator_stake_required,
            genesis.clone(),
        )?;

        let accounts = ledger.all_accounts()?;
        for account in &accounts {
            if account.is_validator(consensus_config.validator_stake_required) {
                live_registry.on_validator_added(account.address.as_str(), account.staked_balance);
            }
        }
        let tracker = Arc::new(SupplyTracker::new(full_scan(&accounts)));

        let active_set = checkpoint::persistence::read_checkpoint(checkpoint_dir(&node_config.data_dir))
            .ok()
            .flatten()
            .map(|cp| {
                ActiveValidatorSet::from_checkpoint(
                    cp.validators.clone(),
                    consensus_config.active_set_size as usize,
                    cp.hash(),
                )
            })
            .unwrap_or_else(|| {
                let snapshot = checkpoint::generation::select_validators(
                    &accounts,
                    consensus_config.validator_stake_required,
                    consensus_config.max_validators,
                );
                ActiveValidatorSet::from_checkpoint(
                    snapshot,
                    consensus_config.active_set_size as usize,
                    shared_types::hash::ZERO_HASH,
                )
            });

        let chain_head = read_chain_head(&ledger)?;

        Ok(Node {
            node_config,
            consensus_config: Arc::new(consensus_config),
            ledger,
            cache: parking_lot::Mutex::new(cache),
            tracker,
            active_set: parking_lot::RwLock::new(active_set),
            live_registry,
            peer_registry: Arc::new(PeerRegistry::new()),
            chain_head: parking_lot::RwLock::new(chain_head),
            activated: AtomicBool::new(false),
            wait_started: parking_lot::Mutex::new(None),
            signer,
            vrf,
        })
    }

    pub fn is_bonded_validator(&self) -> bool {
        self.node_config.is_validator() && self.live_registry.is_validator(self.node_config.address.as_str())
    }

    /// Re-evaluate the activation gate (§4.8) against the current peer
    /// registry and backfill state, flipping `activated` once satisfied.
    pub fn evaluate_activation(&self, probe: activation::ActivationProbe) {
        if self.activated.load(Ordering::SeqCst) {
            return;
        }
        if activation::evaluate(&probe) == activation::ActivationDecision::Activate {
            tracing::info!("validator activation gate satisfied, producer loop unblocked");
            self.activated.store(true, Ordering::SeqCst);
        }
    }

    /// The handshake payload this node sends on every Ping/Pong (§5).
    pub fn current_handshake(&self) -> Handshake {
        let head = self.chain_head.read().clone();
        let checkpoint = checkpoint::persistence::read_checkpoint(checkpoint_dir(&self.node_config.data_dir))
            .ok()
            .flatten();
        Handshake {
            address: self.node_config.address.clone(),
            height: head.height(),
            latest_block_hash: head.hash(),
            checkpoint_height: checkpoint.as_ref().map(|c| c.height).unwrap_or(0),
            checkpoint_hash: checkpoint.as_ref().map(|c| c.hash()).unwrap_or(shared_types::hash::ZERO_HASH),
            checkpoint_timestamp: checkpoint.as_ref().map(|c| c.timestamp).unwrap_or(0),
            consensus_version: self.consensus_config.version,
            consensus_hash: self.consensus_config.consensus_hash(),
        }
    }

    /// Whether `address` is in the checkpoint-anchored active set, used to
    /// tell a sync-worthy validator peer from a history-only one.
    pub fn is_active_validator(&self, address: &str) -> bool {
        self.active_set.read().contains_active(address)
    }

    /// Milliseconds since this node first started waiting on `height`,
    /// resetting the counter whenever `height` changes (a new head landed,
    /// from this node or a peer).
    fn wait_elapsed_ms(&self, height: u64) -> u64 {
        let now = now_ms();
        let mut started = self.wait_started.lock();
        match *started {
            Some((h, first_ms)) if h == height => now.saturating_sub(first_ms),
            _ => {
                *started = Some((height, now));
                0
            }
        }
    }

    fn best_peer_height(&self) -> Option<u64> {
        self.peer_registry
            .best_sync_peer(std::time::Instant::now(), p2p_sync::DEFAULT_LIVENESS)
            .map(|(_, p)| p.height)
    }

    /// Attempt one round of the production scheduler (§4.4 steps 1-11).
    /// `pending` is the sender's admissible transaction pool, already
    /// collected by the mempool (out of core scope; injected here).
    pub fn produce_next_block(&self, pending: Vec<Transaction>) -> Result<Option<Block>, RuntimeError> {
        let head = self.chain_head.read().clone();
        let height = head.height() + 1;

        let isolated = activation::is_isolated(
            self.peer_registry.alive_peers(std::time::Instant::now(), p2p_sync::DEFAULT_LIVENESS).len(),
            !self.node_config.seed_peers.is_empty(),
            self.is_bonded_validator(),
        );
        let is_genesis_validator = self.node_config.address == shared_types::address::genesis_address();

        if block_producer::should_wait_for_gate(
            self.is_bonded_validator(),
            self.activated.load(Ordering::SeqCst),
            isolated,
            is_genesis_validator,
        ) {
            return Ok(None);
        }

        if !block_producer::ready_to_produce(now_ms(), head.timestamp(), self.consensus_config.block_interval_ms) {
            return Ok(None);
        }

        let active = self.active_set.read();
        let refs = active.active_by_address();
        let expected_proposer = consensus::elect(&refs, active.anchor_hash(), height, self.consensus_config.checkpoint_interval)?;
        drop(active);

        let expected_proposer_is_self = expected_proposer == self.node_config.address;
        let wait_elapsed_ms = self.wait_elapsed_ms(height);
        let any_peer_ahead = self.best_peer_height().is_some_and(|h| h > height);

        match block_producer::decide_proposer_action(
            expected_proposer_is_self,
            wait_elapsed_ms,
            self.consensus_config.block_interval_ms,
            any_peer_ahead,
        ) {
            block_producer::ProposerDecision::Produce => {}
            block_producer::ProposerDecision::KeepWaiting | block_producer::ProposerDecision::WaitForElderBrother => {
                return Ok(None);
            }
            block_producer::ProposerDecision::Failover => {
                tracing::warn!(height, expected = %expected_proposer, "expected proposer missed its slot, producing in its place");
            }
        }

        if block_producer::should_sync_before_producing(self.best_peer_height(), height) {
            return Ok(None);
        }

        let cache = self.cache.lock();
        let account_view = |addr: &Address| {
            let mut cache = self.cache.lock();
            let account = cache.get(addr).unwrap_or_else(|_| Account::new(addr.clone()));
            AccountView { nonce: account.nonce, available_balance: account.available_balance, staked_balance: account.staked_balance }
        };
        drop(cache);
        let admitted = dedupe_and_admit(
            pending,
            account_view,
            self.consensus_config.min_gas_fee,
            self.consensus_config.max_gas_fee,
            self.consensus_config.max_tx_data_size as usize,
        );

        let genesis_balance = {
            let mut cache = self.cache.lock();
            cache.get(&shared_types::address::genesis_address().clone())?.available_balance
        };
        let reward = consensus::block_reward(
            genesis_balance,
            self.consensus_config.base_block_reward,
            self.consensus_config.min_reward_unit,
            &self.consensus_config.reward_thresholds,
        );

        let mut cache = self.cache.lock();
        let produced = block_producer::produce_block(
            &self.ledger,
            &mut cache,
            &self.tracker,
            self.live_registry.as_ref(),
            self.consensus_config.validator_stake_required,
            shared_types::address::genesis_address().clone(),
            self.consensus_config.checkpoint_interval,
            &head,
            self.node_config.address.clone(),
            now_ms(),
            admitted,
            reward,
            &self.signer,
            &self.vrf,
        )?;
        drop(cache);

        let block = Block::Real(produced.block.clone());
        *self.chain_head.write() = block.clone();

        if produced.is_checkpoint_height {
            self.generate_checkpoint(height)?;
        }

        Ok(Some(block))
    }

    fn generate_checkpoint(&self, height: u64) -> Result<(), RuntimeError> {
        let accounts = {
            let mut cache = self.cache.lock();
            cache.merged_accounts()?
        };
        let head = self.chain_head.read().clone();
        let prev_hash = self
            .ledger
            .read_block(height.saturating_sub(1), false)?
            .map(|b| b.hash())
            .unwrap_or(shared_types::hash::ZERO_HASH);

        let (last_good_height, last_good_accounts) =
            checkpoint::persistence::read_state_snapshot(checkpoint_dir(&self.node_config.data_dir))
                .ok()
                .flatten()
                .map(|s| (s.height, s.accounts))
                .unwrap_or_else(|| (0, genesis_only_accounts()));

        let target: GenerationTarget = checkpoint::verify_or_rollback::<LedgerStore, S>(
            self.ledger.as_ref(),
            height,
            accounts,
            self.tracker.current(),
            last_good_height,
            last_good_accounts,
            self.consensus_config.checkpoint_interval * 10,
            self.consensus_config.validator_stake_required,
            shared_types::address::genesis_address().clone(),
        )?;

        let generated = checkpoint::build_checkpoint(
            &target,
            head.hash(),
            prev_hash,
            now_ms(),
            self.node_config.address.clone(),
            self.consensus_config.validator_stake_required,
            self.consensus_config.max_validators,
            &self.signer,
        );

        let snapshot = checkpoint::StateSnapshot { height: target.height, accounts: target.accounts.clone() };
        checkpoint::persistence::write_state_snapshot(checkpoint_dir(&self.node_config.data_dir), &snapshot)?;
        checkpoint::persistence::write_checkpoint(checkpoint_dir(&self.node_config.data_dir), &generated)?;

        if target.height < height {
            tracing::warn!(anchored = target.height, requested = height, "checkpoint rolled back, pruning local blocks above the anchor");
            self.ledger.rollback_to(target.height, height)?;
        }

        *self.active_set.write() = ActiveValidatorSet::from_checkpoint(
            generated.validators.clone(),
            self.consensus_config.active_set_size as usize,
            generated.hash(),
        );

        Ok(())
    }
}

fn checkpoint_dir(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join("checkpoints")
}

fn bootstrap_genesis(ledger: &Arc<LedgerStore>, genesis: Address, consensus_config: &ConsensusConfig) -> Result<(), RuntimeError> {
    let mut genesis_account = Account::new(genesis);
    genesis_account.available_balance = TOTAL_SUPPLY;
    ledger.commit_accounts(&[genesis_account], 0)?;
    let placeholder = Block::Placeholder(shared_types::block::PlaceholderBlock {
        height: 0,
        hash: shared_types::hash::ZERO_HASH,
        timestamp: consensus_config.genesis_timestamp,
    });
    ledger.append_block(0, &placeholder)?;
    Ok(())
}

/// The state baseline for a chain's very first checkpoint cycle, before any
/// [`checkpoint::StateSnapshot`] has ever been persisted.
fn genesis_only_accounts() -> Vec<Account> {
    let mut genesis_account = Account::new(shared_types::address::genesis_address());
    genesis_account.available_balance = TOTAL_SUPPLY;
    vec![genesis_account]
}

fn read_chain_head(ledger: &Arc<LedgerStore>) -> Result<Block, RuntimeError> {
    let height = ledger.latest_height()?.unwrap_or(0);
    Ok(ledger
        .read_block(height, false)?
        .unwrap_or(Block::Placeholder(shared_types::block::PlaceholderBlock {
            height: 0,
            hash: shared_types::hash::ZERO_HASH,
            timestamp: 0,
        })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::testing::{FakeSigner, FakeVrfProver};
    use shared_types::NodeType;

    fn node_config(dir: &Path, address: Address) -> NodeConfig {
        NodeConfig {
            node_type: NodeType::Validator,
            address,
            api_port: 8080,
            p2p_port: 30303,
            seed_peers: vec![],
            public_ip: "127.0.0.1".to_string(),
            data_dir: dir.to_path_buf(),
            private_key_file: dir.join("priv.key"),
            public_key_file: dir.join("pub.key"),
        }
    }

    #[test]
    fn new_bootstraps_a_fresh_genesis_account() {
        let dir = tempfile::tempdir().unwrap();
        let address = Address::derive(b"validator-1");
        let config = node_config(dir.path(), address);
        let signer = FakeSigner::new(b"validator-1".to_vec());
        let vrf = FakeVrfProver::new(b"validator-1".to_vec());

        let node = Node::new(config, ConsensusConfig::default(), signer, vrf).unwrap();

        assert_eq!(node.chain_head.read().height(), 0);
        let genesis_balance = node.cache.lock().get(&shared_types::address::genesis_address()).unwrap().available_balance;
        assert_eq!(genesis_balance, TOTAL_SUPPLY);
    }

    #[test]
    fn produces_a_block_once_activated_and_bonded() {
        let dir = tempfile::tempdir().unwrap();
        // The genesis address doubles as the sole bonded validator here so
        // the isolated-mode carve-out (only a genesis validator may
        // produce alone) applies without needing a live peer.
        let address = shared_types::address::genesis_address();

        let ledger = Arc::new(LedgerStore::open(dir.path()).unwrap());
        let consensus_config = ConsensusConfig::default();
        let mut genesis_account = Account::new(address.clone());
        genesis_account.available_balance = TOTAL_SUPPLY - 2_000_000;
        genesis_account.staked_balance = 2_000_000;
        genesis_account.node_type = shared_types::NodeType::Validator;
        ledger.commit_accounts(&[genesis_account], 0).unwrap();
        let placeholder = Block::Placeholder(shared_types::block::PlaceholderBlock {
            height: 0,
            hash: shared_types::hash::ZERO_HASH,
            timestamp: 0,
        });
        ledger.append_block(0, &placeholder).unwrap();
        drop(ledger);

        let config = node_config(dir.path(), address);
        let signer = FakeSigner::new(b"validator-1".to_vec());
        let vrf = FakeVrfProver::new(b"validator-1".to_vec());

        let node = Node::new(config, consensus_config, signer, vrf).unwrap();
        assert!(node.is_bonded_validator());
        node.activated.store(true, Ordering::SeqCst);

        // Sole active validator: always the expected proposer.
        let produced = node.produce_next_block(vec![]).unwrap();
        assert_eq!(produced.unwrap().height(), 1);
    }
}
