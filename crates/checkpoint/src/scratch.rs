//! An in-memory [`AccountLedger`] used only to replay a handful of blocks
//! during the bounded reverse-supply-scan rollback search. Never touches
//! the real sharded store: the real rollback is applied afterward, once a
//! valid height has been found, via [`ledger_store::LedgerStore::replace_all_accounts`].

use state_engine::AccountLedger;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct ScratchLedger {
    accounts: Mutex<HashMap<String, shared_types::Account>>,
    state_height: Mutex<u64>,
}

impl ScratchLedger {
    pub fn seeded(accounts: Vec<shared_types::Account>, height: u64) -> Self {
        let map = accounts.into_iter().map(|a| (a.address.as_str().to_string(), a)).collect();
        ScratchLedger { accounts: Mutex::new(map), state_height: Mutex::new(height) }
    }
}

impl AccountLedger for ScratchLedger {
    fn get_account(&self, address: &str) -> Result<Option<shared_types::Account>, ledger_store::StorageError> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    fn all_accounts(&self) -> Result<Vec<shared_types::Account>, ledger_store::StorageError> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    fn commit_accounts(&self, dirty: &[shared_types::Account], height: u64) -> Result<(), ledger_store::StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        for account in dirty {
            accounts.insert(account.address.as_str().to_string(), account.clone());
        }
        *self.state_height.lock().unwrap() = height;
        Ok(())
    }

    fn state_height(&self) -> Result<u64, ledger_store::StorageError> {
        Ok(*self.state_height.lock().unwrap())
    }

    fn replace_all_accounts(&self, accounts: &[shared_types::Account], height: u64) -> Result<(), ledger_store::StorageError> {
        *self.accounts.lock().unwrap() = accounts.iter().map(|a| (a.address.as_str().to_string(), a.clone())).collect();
        *self.state_height.lock().unwrap() = height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    #[test]
    fn seeded_accounts_are_readable() {
        let account = shared_types::Account::new(Address::derive(b"a"));
        let ledger = ScratchLedger::seeded(vec![account.clone()], 5);
        let read_back = ledger.get_account(account.address.as_str()).unwrap().expect("account present");
        assert_eq!(read_back.address, account.address);
        assert_eq!(ledger.state_height().unwrap(), 5);
    }
}
