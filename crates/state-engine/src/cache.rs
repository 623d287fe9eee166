//! Account cache + dirty set, with O(cache) snapshot/restore for
//! speculative per-block execution.

use crate::errors::StateError;
use crate::ports::AccountLedger;
use shared_types::{Account, Address};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A deep copy of the cache and dirty set, restorable on execution
/// failure.
#[derive(Clone)]
pub struct CacheSnapshot {
    cache: HashMap<String, Account>,
    dirty: HashSet<String>,
}

/// Read-through cache over the account store, tracking which addresses
/// have been mutated since the last commit.
pub struct AccountCache<L: AccountLedger> {
    ledger: Arc<L>,
    cache: HashMap<String, Account>,
    dirty: HashSet<String>,
}

impl<L: AccountLedger> AccountCache<L> {
    /// Build an empty cache over `ledger`.
    pub fn new(ledger: Arc<L>) -> Self {
        AccountCache { ledger, cache: HashMap::new(), dirty: HashSet::new() }
    }

    /// Read an account, falling through to the store and caching the
    /// result. Addresses with no stored account yet are materialized as a
    /// fresh zero-balance [`Account`] (first credit creates the row).
    pub fn get(&mut self, address: &Address) -> Result<Account, StateError> {
        let key = address.as_str().to_string();
        if let Some(account) = self.cache.get(&key) {
            return Ok(account.clone());
        }
        let account = match self.ledger.get_account(&key)? {
            Some(account) => account,
            None => Account::new(address.clone()),
        };
        self.cache.insert(key, account.clone());
        Ok(account)
    }

    /// Write an account back into the cache and mark it dirty.
    pub fn put(&mut self, account: Account) {
        let key = account.address.as_str().to_string();
        self.dirty.insert(key.clone());
        self.cache.insert(key, account);
    }

    /// Deep-copy the cache and dirty set.
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot { cache: self.cache.clone(), dirty: self.dirty.clone() }
    }

    /// Restore a prior snapshot, discarding any mutation made since it was
    /// taken. Used to abort a block whose execution failed partway
    /// through.
    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        self.cache = snapshot.cache;
        self.dirty = snapshot.dirty;
    }

    /// Every account currently marked dirty.
    pub fn dirty_accounts(&self) -> Vec<Account> {
        self.dirty
            .iter()
            .filter_map(|key| self.cache.get(key).cloned())
            .collect()
    }

    /// Flush the dirty set to the store as one atomic commit at `height`,
    /// then clear the dirty set. The cache itself is left intact: it
    /// remains a valid read-through view.
    pub fn commit(&mut self, height: u64) -> Result<(), StateError> {
        let dirty = self.dirty_accounts();
        self.ledger.commit_accounts(&dirty, height)?;
        self.dirty.clear();
        Ok(())
    }

    /// The merged cache-over-store account set: every stored account, with
    /// any cached (possibly dirty) version taking precedence, plus any
    /// cached account not yet present in the store. Used for the full
    /// supply scan and for checkpoint state-root generation.
    pub fn merged_accounts(&self) -> Result<Vec<Account>, StateError> {
        let mut merged: HashMap<String, Account> = self
            .ledger
            .all_accounts()?
            .into_iter()
            .map(|a| (a.address.as_str().to_string(), a))
            .collect();
        for (key, account) in &self.cache {
            merged.insert(key.clone(), account.clone());
        }
        Ok(merged.into_values().collect())
    }

    /// Drop every cached entry and dirty mark. Used after a checkpoint
    /// state-data apply replaces the whole account set underneath the
    /// cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.dirty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AccountLedger;
    use ledger_store::StorageError;
    use std::sync::Mutex;

    struct FakeLedger {
        store: Mutex<HashMap<String, Account>>,
        state_height: Mutex<u64>,
    }

    impl FakeLedger {
        fn new() -> Self {
            FakeLedger { store: Mutex::new(HashMap::new()), state_height: Mutex::new(0) }
        }
    }

    impl AccountLedger for FakeLedger {
        fn get_account(&self, address: &str) -> Result<Option<Account>, StorageError> {
            Ok(self.store.lock().unwrap().get(address).cloned())
        }
        fn all_accounts(&self) -> Result<Vec<Account>, StorageError> {
            Ok(self.store.lock().unwrap().values().cloned().collect())
        }
        fn commit_accounts(&self, dirty: &[Account], height: u64) -> Result<(), StorageError> {
            let mut store = self.store.lock().unwrap();
            for a in dirty {
                store.insert(a.address.as_str().to_string(), a.clone());
            }
            *self.state_height.lock().unwrap() = height;
            Ok(())
        }
        fn state_height(&self) -> Result<u64, StorageError> {
            Ok(*self.state_height.lock().unwrap())
        }
        fn replace_all_accounts(&self, accounts: &[Account], height: u64) -> Result<(), StorageError> {
            let mut store = self.store.lock().unwrap();
            store.clear();
            for a in accounts {
                store.insert(a.address.as_str().to_string(), a.clone());
            }
            *self.state_height.lock().unwrap() = height;
            Ok(())
        }
    }

    #[test]
    fn get_creates_zero_balance_account_for_unknown_address() {
        let mut cache = AccountCache::new(Arc::new(FakeLedger::new()));
        let addr = Address::derive(b"new");
        let account = cache.get(&addr).unwrap();
        assert_eq!(account.available_balance, 0);
    }

    #[test]
    fn snapshot_restore_discards_uncommitted_mutation() {
        let mut cache = AccountCache::new(Arc::new(FakeLedger::new()));
        let addr = Address::derive(b"alice");
        let snap = cache.snapshot();
        let mut a = cache.get(&addr).unwrap();
        a.available_balance = 500;
        cache.put(a);
        assert_eq!(cache.dirty_accounts().len(), 1);

        cache.restore(snap);
        assert!(cache.dirty_accounts().is_empty());
    }

    #[test]
    fn commit_flushes_dirty_and_clears_dirty_set() {
        let ledger = Arc::new(FakeLedger::new());
        let mut cache = AccountCache::new(ledger.clone());
        let addr = Address::derive(b"bob");
        let mut a = cache.get(&addr).unwrap();
        a.available_balance = 10;
        cache.put(a);
        cache.commit(7).unwrap();

        assert!(cache.dirty_accounts().is_empty());
        assert_eq!(ledger.state_height().unwrap(), 7);
        assert_eq!(ledger.get_account(addr.as_str()).unwrap().unwrap().available_balance, 10);
    }
}
