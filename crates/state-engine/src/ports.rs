//! Trait seams the state engine depends on, injected at construction —
//! never a global registry, never shared mutable state across components.

use shared_types::{Account, Block};

/// Fired synchronously from within `Stake`/`Unstake` execution when an
/// account's validator predicate newly holds or newly fails. Consensus
/// implements this to keep its validator set in sync without the state
/// engine holding a reference to consensus's data structures.
pub trait ValidatorSetObserver: Send + Sync {
    /// `address` crossed the stake threshold and is now a validator.
    fn on_validator_added(&self, address: &str, staked: u64);

    /// `address` fell below the stake threshold and is no longer a
    /// validator.
    fn on_validator_removed(&self, address: &str);
}

/// An observer that does nothing; useful for recovery replay and tests
/// where validator-set side effects are not under test.
pub struct NullValidatorSetObserver;

impl ValidatorSetObserver for NullValidatorSetObserver {
    fn on_validator_added(&self, _address: &str, _staked: u64) {}
    fn on_validator_removed(&self, _address: &str) {}
}

/// The persistence surface the state engine needs from the ledger store.
/// Narrower than the full `ledger-store` facade so tests can supply an
/// in-memory fake instead of standing up rocksdb.
pub trait AccountLedger: Send + Sync {
    /// Look up a single account.
    fn get_account(&self, address: &str) -> Result<Option<Account>, ledger_store::StorageError>;

    /// Every account currently in the store (used for the full supply
    /// scan and checkpoint state-root generation).
    fn all_accounts(&self) -> Result<Vec<Account>, ledger_store::StorageError>;

    /// Atomically write dirty accounts and advance `state_height`.
    fn commit_accounts(&self, dirty: &[Account], height: u64) -> Result<(), ledger_store::StorageError>;

    /// Height of the last committed account batch.
    fn state_height(&self) -> Result<u64, ledger_store::StorageError>;

    /// Replace the entire account set, e.g. for a checkpoint state-data
    /// apply.
    fn replace_all_accounts(&self, accounts: &[Account], height: u64) -> Result<(), ledger_store::StorageError>;
}

/// The block-read surface crash recovery needs from the ledger store.
pub trait BlockSource: Send + Sync {
    /// Read the block at `height`, trusting the stored bytes (recovery
    /// replays blocks this node already validated and wrote itself).
    fn read_block(&self, height: u64) -> Result<Option<Block>, ledger_store::StorageError>;
}

impl BlockSource for ledger_store::LedgerStore {
    fn read_block(&self, height: u64) -> Result<Option<Block>, ledger_store::StorageError> {
        ledger_store::LedgerStore::read_block(self, height, false)
    }
}

impl AccountLedger for ledger_store::LedgerStore {
    fn get_account(&self, address: &str) -> Result<Option<Account>, ledger_store::StorageError> {
        ledger_store::LedgerStore::get_account(self, address)
    }

    fn all_accounts(&self) -> Result<Vec<Account>, ledger_store::StorageError> {
        ledger_store::LedgerStore::all_accounts(self)
    }

    fn commit_accounts(&self, dirty: &[Account], height: u64) -> Result<(), ledger_store::StorageError> {
        ledger_store::LedgerStore::commit_accounts(self, dirty, height)
    }

    fn state_height(&self) -> Result<u64, ledger_store::StorageError> {
        ledger_store::LedgerStore::state_height(self)
    }

    fn replace_all_accounts(&self, accounts: &[Account], height: u64) -> Result<(), ledger_store::StorageError> {
        ledger_store::LedgerStore::replace_all_accounts(self, accounts, height)
    }
}
