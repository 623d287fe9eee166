//! The narrow persistence seam this crate needs beyond
//! [`state_engine::AccountLedger`]: appending the produced block itself.
//! Kept separate so tests can supply an in-memory fake instead of standing
//! up rocksdb.

use shared_types::{Block, Hash};

/// Appends newly produced blocks to the block store.
pub trait BlockSink: Send + Sync {
    /// Persist `block` at `height`, returning its hash.
    fn append_block(&self, height: u64, block: &Block) -> Result<Hash, ledger_store::StorageError>;
}

impl BlockSink for ledger_store::LedgerStore {
    fn append_block(&self, height: u64, block: &Block) -> Result<Hash, ledger_store::StorageError> {
        ledger_store::LedgerStore::append_block(self, height, block)
    }
}
