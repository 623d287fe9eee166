//! Strict-mode execution, the atomic block/state/head commit order, and
//! the periodic checkpoint trigger (§4.4 steps 8-11, §4.5 step 1 onward).

use crate::assembly;
use crate::errors::ProducerError;
use crate::ports::BlockSink;
use shared_crypto::{Signer, VrfProver};
use shared_types::{Address, Block, RealBlock, Transaction};
use state_engine::{AccountCache, AccountLedger, SupplyTracker, TransactionExecutor, ValidatorSetObserver};
use std::sync::Arc;

/// The result of [`produce_block`]: the committed block, and whether
/// `H mod checkpoint_interval == 0` (the caller is responsible for acting
/// on this via [`crate::checkpoint_trigger::maybe_generate_checkpoint`]).
pub struct ProducedBlock {
    pub block: RealBlock,
    pub is_checkpoint_height: bool,
}

/// Assemble and commit one block on top of `prev`. `admitted` must already
/// be deduped and admitted (see [`crate::dedup::dedupe_and_admit`]) — this
/// function appends the reward transaction itself.
///
/// Step 8: execute each transaction in strict mode (any failure aborts the
/// whole block and restores the pre-execution cache snapshot — this is
/// distinct from a single forged transaction, which the executor resolves
/// by confiscation without failing).
///
/// Step 9 (atomic commit order): persist the block, then commit account
/// state at the new height (the crash-recovery marker), then — the
/// caller's responsibility, since chain-head is not owned by this crate —
/// advance the in-memory head.
#[allow(clippy::too_many_arguments)]
pub fn produce_block<L, S, V>(
    ledger: &Arc<L>,
    cache: &mut AccountCache<L>,
    tracker: &SupplyTracker,
    observer: &dyn ValidatorSetObserver,
    validator_stake_required: u64,
    genesis: Address,
    checkpoint_interval: u64,
    prev: &Block,
    proposer: Address,
    timestamp: u64,
    admitted: Vec<Transaction>,
    reward_amount: u64,
    signer: &S,
    vrf_prover: &V,
) -> Result<ProducedBlock, ProducerError>
where
    L: AccountLedger + BlockSink,
    S: Signer,
    V: VrfProver,
{
    let snapshot = cache.snapshot();

    let mut transactions = admitted;
    transactions.push(assembly::reward_transaction(genesis.clone(), proposer.clone(), reward_amount, timestamp));

    {
        let mut executor = TransactionExecutor::new(cache, tracker, validator_stake_required, genesis.clone());
        for tx in &transactions {
            if let Err(e) = executor.execute::<S>(tx, observer) {
                cache.restore(snapshot);
                return Err(e.into());
            }
        }
    }

    let merged = cache.merged_accounts()?;
    let state_root = checkpoint::generation::state_root(&merged);

    let mut block = assembly::assemble(prev, proposer, timestamp, transactions, state_root, vrf_prover);
    assembly::sign(&mut block, signer);

    let height = block.header.height;
    ledger.append_block(height, &Block::Real(block.clone()))?;
    cache.commit(height)?;

    Ok(ProducedBlock { block, is_checkpoint_height: height != 0 && height % checkpoint_interval == 0 })
}
