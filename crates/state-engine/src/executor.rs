//! Per-transaction execution against the account cache.
//!
//! Every balance mutation goes through [`TransactionExecutor::debit`]/
//! [`TransactionExecutor::credit`], which update both the account and the
//! supply tracker in lockstep — the single discipline that keeps P0 from
//! drifting.

use crate::cache::AccountCache;
use crate::errors::StateError;
use crate::ports::{AccountLedger, ValidatorSetObserver};
use crate::supply::SupplyTracker;
use shared_crypto::Signer;
use shared_types::{Account, Address, NodeType, Transaction, TxType};

/// Executes transactions against an [`AccountCache`], updating a
/// [`SupplyTracker`] and firing [`ValidatorSetObserver`] callbacks as a
/// side effect of `Stake`/`Unstake`.
pub struct TransactionExecutor<'a, L: AccountLedger> {
    cache: &'a mut AccountCache<L>,
    tracker: &'a SupplyTracker,
    validator_stake_required: u64,
    genesis: Address,
}

impl<'a, L: AccountLedger> TransactionExecutor<'a, L> {
    /// Build an executor over `cache`, tracking supply in `tracker`. A
    /// `Stake`/`Unstake` that crosses `validator_stake_required` is
    /// reported to `observer`.
    pub fn new(
        cache: &'a mut AccountCache<L>,
        tracker: &'a SupplyTracker,
        validator_stake_required: u64,
        genesis: Address,
    ) -> Self {
        TransactionExecutor { cache, tracker, validator_stake_required, genesis }
    }

    fn debit(&self, account: &mut Account, amount: u64) {
        account.available_balance -= amount;
        self.tracker.debit(amount);
    }

    fn credit(&self, account: &mut Account, amount: u64) {
        account.available_balance += amount;
        self.tracker.credit(amount);
    }

    /// Execute one transaction, mutating the cache and tracker. Structural
    /// validation is assumed to have already passed
    /// ([`Transaction::validate_structure`]) — this only performs the
    /// runtime checks that depend on account state: signature/address
    /// verification and confiscation, nonce matching, and the per-type
    /// balance effects.
    pub fn execute<S: Signer>(
        &mut self,
        tx: &Transaction,
        observer: &dyn ValidatorSetObserver,
    ) -> Result<(), StateError> {
        if tx.is_system() {
            return self.execute_system(tx);
        }

        if let Some(confiscated) = self.check_forgery::<S>(tx)? {
            self.confiscate(confiscated)?;
            // The forged transaction itself does not execute further —
            // the carrying block still commits (confiscation is the
            // transition, not an abort of the block).
            return Ok(());
        }

        let mut from = self.cache.get(&tx.from)?;
        if tx.nonce != from.nonce {
            return Err(StateError::NonceMismatch {
                address: tx.from.as_str().to_string(),
                expected: from.nonce,
                actual: tx.nonce,
            });
        }

        match tx.tx_type {
            TxType::Transfer => self.execute_transfer(tx, &mut from)?,
            TxType::Stake => self.execute_stake(tx, &mut from, observer)?,
            TxType::Unstake => self.execute_unstake(tx, &mut from, observer)?,
            TxType::Reward | TxType::Slash => unreachable!("system transactions handled above"),
        }

        from.nonce += 1;
        self.cache.put(from);
        Ok(())
    }

    fn execute_system(&mut self, tx: &Transaction) -> Result<(), StateError> {
        match tx.tx_type {
            TxType::Reward => {
                if tx.from == self.genesis && tx.to == self.genesis {
                    return Ok(());
                }
                let mut genesis = self.cache.get(&self.genesis)?;
                self.debit(&mut genesis, tx.amount);
                self.cache.put(genesis);

                let mut recipient = self.cache.get(&tx.to)?;
                self.credit(&mut recipient, tx.amount);
                self.cache.put(recipient);
            }
            TxType::Slash => {
                if tx.from == self.genesis && tx.to == self.genesis {
                    return Ok(());
                }
                let mut offender = self.cache.get(&tx.from)?;
                self.debit(&mut offender, tx.amount);
                self.cache.put(offender);

                let mut genesis = self.cache.get(&self.genesis)?;
                self.credit(&mut genesis, tx.amount);
                self.cache.put(genesis);
            }
            _ => unreachable!("only Reward/Slash are system transactions"),
        }
        Ok(())
    }

    /// Verify the signature and the address-from-public-key equality. On
    /// failure, returns the address that must be confiscated: the real
    /// owner of the asserted public key (which may differ from `tx.from`).
    fn check_forgery<S: Signer>(&self, tx: &Transaction) -> Result<Option<Address>, StateError> {
        let public_key = tx.public_key.as_deref().unwrap_or_default();
        let signature = tx.signature.as_deref().unwrap_or_default();
        let signing_bytes = tx.signing_bytes();

        let signature_ok = S::verify(public_key, &signing_bytes, signature).is_ok();
        let derived = Address::derive(public_key);
        let address_ok = derived == tx.from;

        if signature_ok && address_ok {
            return Ok(None);
        }
        if derived == self.genesis {
            // Genesis is exempt from confiscation even if it is somehow
            // the asserted forger.
            return Ok(None);
        }
        Ok(Some(derived))
    }

    /// Move every balance held by `offender` to genesis and reset its
    /// `node_type`. A state transition, not an abort: P0 must hold after.
    fn confiscate(&mut self, offender: Address) -> Result<(), StateError> {
        let mut offender_account = self.cache.get(&offender)?;
        let total = offender_account.total();
        if total == 0 {
            return Ok(());
        }

        self.tracker.debit(total);
        offender_account.available_balance = 0;
        offender_account.staked_balance = 0;
        offender_account.node_type = NodeType::Regular;
        self.cache.put(offender_account);

        let mut genesis = self.cache.get(&self.genesis)?;
        self.tracker.credit(total);
        genesis.available_balance += total;
        self.cache.put(genesis);
        Ok(())
    }

    fn execute_transfer(&mut self, tx: &Transaction, from: &mut Account) -> Result<(), StateError> {
        let required = tx.amount + tx.gas_fee;
        if from.available_balance < required {
            return Err(StateError::InsufficientBalance {
                address: tx.from.as_str().to_string(),
                required,
                available: from.available_balance,
            });
        }
        self.debit(from, required);

        let mut to = self.cache.get(&tx.to)?;
        self.credit(&mut to, tx.amount);
        self.cache.put(to);

        if tx.to != self.genesis && tx.gas_fee > 0 {
            let mut genesis = self.cache.get(&self.genesis)?;
            self.credit(&mut genesis, tx.gas_fee);
            self.cache.put(genesis);
        }
        Ok(())
    }

    fn execute_stake(
        &mut self,
        tx: &Transaction,
        from: &mut Account,
        observer: &dyn ValidatorSetObserver,
    ) -> Result<(), StateError> {
        if from.available_balance < tx.amount {
            return Err(StateError::InsufficientBalance {
                address: tx.from.as_str().to_string(),
                required: tx.amount,
                available: from.available_balance,
            });
        }
        let was_validator = from.is_validator(self.validator_stake_required);
        from.available_balance -= tx.amount;
        from.staked_balance += tx.amount;
        let is_validator = from.is_validator(self.validator_stake_required);
        if !was_validator && is_validator {
            observer.on_validator_added(tx.from.as_str(), from.staked_balance);
        }
        Ok(())
    }

    fn execute_unstake(
        &mut self,
        tx: &Transaction,
        from: &mut Account,
        observer: &dyn ValidatorSetObserver,
    ) -> Result<(), StateError> {
        if from.staked_balance < tx.amount {
            return Err(StateError::InsufficientStake {
                address: tx.from.as_str().to_string(),
                requested: tx.amount,
                staked: from.staked_balance,
            });
        }
        let was_validator = from.is_validator(self.validator_stake_required);
        from.staked_balance -= tx.amount;
        from.available_balance += tx.amount;
        let is_validator = from.is_validator(self.validator_stake_required);
        if was_validator && !is_validator {
            observer.on_validator_removed(tx.from.as_str());
        }
        Ok(())
    }
}
