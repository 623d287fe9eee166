//! # Ledger Store
//!
//! Durable storage for this node core: the append-only block chunk store,
//! the sharded account store, and the auxiliary chain indices, composed
//! behind a single [`LedgerStore`] facade.
//!
//! ## Crash Recovery
//!
//! Blocks are appended to the chunk store and indexed before the account
//! store's `state_height` marker advances. On restart, [`LedgerStore::open`]
//! compares the chunk store's tip height against [`AccountStore::state_height`];
//! a gap means the last block's execution was interrupted and the caller
//! (the state engine) must replay from `state_height + 1`.

pub mod account_store;
pub mod chunk;
pub mod errors;
pub mod index;

pub use account_store::AccountStore;
pub use chunk::ChunkStore;
pub use errors::StorageError;
pub use index::ChainIndex;

use shared_types::{Account, Block, Hash};
use std::path::Path;

/// Facade over the chunk store, account store, and chain index, rooted at
/// one data directory.
pub struct LedgerStore {
    chunks: ChunkStore,
    accounts: AccountStore,
    index: ChainIndex,
}

impl LedgerStore {
    /// Open (creating if absent) every component store under `base_dir`.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_dir = base_dir.as_ref();
        let chunks = ChunkStore::open(base_dir.join("blocks"))?;
        let accounts = AccountStore::open(base_dir.join("accounts"))?;
        let index = ChainIndex::open(base_dir.join("index"))?;
        Ok(LedgerStore { chunks, accounts, index })
    }

    /// Append `block`, recording it in both the chunk store and the
    /// indices. Does not touch account state; callers commit account
    /// effects separately once execution succeeds.
    pub fn append_block(&self, height: u64, block: &Block) -> Result<Hash, StorageError> {
        let hash = self.chunks.write_block(height, block)?;
        self.index.index_block(block)?;
        Ok(hash)
    }

    /// Read the block at `height`.
    pub fn read_block(&self, height: u64, verify: bool) -> Result<Option<Block>, StorageError> {
        self.chunks.read_block(height, verify)
    }

    /// Roll the ledger back to `height`: drop blocks above it from the
    /// chunk store and from the indices, then reset the tip marker.
    pub fn rollback_to(&self, height: u64, tip_before_rollback: u64) -> Result<(), StorageError> {
        for h in (height + 1)..=tip_before_rollback {
            if let Some(block) = self.chunks.read_block(h, false)? {
                self.index.remove_block(&block)?;
            }
        }
        self.chunks.delete_above(height)?;
        self.index.set_latest_height(height)?;
        Ok(())
    }

    /// Drop whole chunks entirely below `keep_from_height`.
    pub fn prune_below(&self, keep_from_height: u64) -> Result<(), StorageError> {
        self.chunks.prune_below(keep_from_height)
    }

    /// Look up an account.
    pub fn get_account(&self, address: &str) -> Result<Option<Account>, StorageError> {
        self.accounts.get(address)
    }

    /// Commit a set of dirty accounts at `height`, advancing the account
    /// store's `state_height` marker.
    pub fn commit_accounts(&self, dirty: &[Account], height: u64) -> Result<(), StorageError> {
        self.accounts.commit(dirty, height)
    }

    /// Every account currently in the store.
    pub fn all_accounts(&self) -> Result<Vec<Account>, StorageError> {
        self.accounts.all_accounts()
    }

    /// Replace the entire account set, e.g. for a checkpoint state-data
    /// apply.
    pub fn replace_all_accounts(&self, accounts: &[Account], height: u64) -> Result<(), StorageError> {
        self.accounts.clear_all()?;
        self.accounts.bulk_insert(accounts)?;
        self.accounts.set_state_height(height)
    }

    /// Height of the last committed account batch.
    pub fn state_height(&self) -> Result<u64, StorageError> {
        self.accounts.state_height()
    }

    /// Height of the chain tip as recorded in the indices.
    pub fn latest_height(&self) -> Result<Option<u64>, StorageError> {
        self.index.latest_height()
    }

    /// Height at which a transaction hash was included, if any.
    pub fn height_of_transaction(&self, tx_hash: &Hash) -> Result<Option<u64>, StorageError> {
        self.index.height_of_transaction(tx_hash)
    }

    /// Height at which a block hash was committed, if any.
    pub fn height_of_block_hash(&self, block_hash: &Hash) -> Result<Option<u64>, StorageError> {
        self.index.height_of_block_hash(block_hash)
    }
}
