//! Pending-transaction dedup and admission (§4.4 scheduler step 6 and the
//! trailing "Dedup order" paragraph): group by sender, drop duplicate
//! nonces, and keep only the sequential run starting at the sender's
//! current nonce whose balances permit execution.

use shared_types::{Address, Transaction, TxType};
use std::collections::HashMap;

/// The account state a sender's admission run is checked against, as of
/// immediately before this block (the producer's own cache read, not a
/// speculative simulation).
#[derive(Debug, Clone, Copy)]
pub struct AccountView {
    pub nonce: u64,
    pub available_balance: u64,
    pub staked_balance: u64,
}

/// Deduplicate and admit `pending` against account state supplied by
/// `account_view`. Returns the admitted transactions ordered by
/// `(from, nonce)`, a stable order independent of mempool arrival order.
/// A transaction that fails structural validation (gas-fee bounds,
/// data size, self-transfer) is dropped like any other inadmissible entry;
/// it does not break the run for the sender's later nonces.
pub fn dedupe_and_admit(
    pending: Vec<Transaction>,
    account_view: impl Fn(&Address) -> AccountView,
    min_gas_fee: u64,
    max_gas_fee: u64,
    max_data_size: usize,
) -> Vec<Transaction> {
    let mut by_sender: HashMap<String, Vec<Transaction>> = HashMap::new();
    for tx in pending {
        by_sender.entry(tx.from.as_str().to_string()).or_default().push(tx);
    }

    let mut admitted = Vec::new();
    for mut txs in by_sender.into_values() {
        txs.sort_by_key(|t| t.nonce);
        txs.dedup_by_key(|t| t.nonce);

        let from = txs[0].from.clone();
        let view = account_view(&from);
        let mut current_nonce = view.nonce;
        let mut available = view.available_balance;
        let mut staked = view.staked_balance;

        for tx in txs {
            if tx.nonce < current_nonce {
                // Already-applied nonce (stale mempool entry): skip it, it
                // does not break the run for the entries that follow.
                continue;
            }
            if tx.nonce > current_nonce {
                // A forward gap: later entries from this sender can never
                // become admissible this round either.
                break;
            }
            if tx.validate_structure(min_gas_fee, max_gas_fee, max_data_size).is_err() {
                // Dedup already keeps at most one entry per nonce, so there
                // is no alternative candidate for this slot: the run stops
                // here just as it would on an unaffordable transaction.
                break;
            }
            let permitted = match tx.tx_type {
                TxType::Transfer => {
                    let required = tx.amount + tx.gas_fee;
                    if required > available {
                        false
                    } else {
                        available -= required;
                        true
                    }
                }
                TxType::Stake => {
                    if tx.amount > available {
                        false
                    } else {
                        available -= tx.amount;
                        staked += tx.amount;
                        true
                    }
                }
                TxType::Unstake => {
                    if tx.amount > staked {
                        false
                    } else {
                        staked -= tx.amount;
                        available += tx.amount;
                        true
                    }
                }
                TxType::Reward | TxType::Slash => {
                    unreachable!("system transactions are never pending user transactions")
                }
            };
            if !permitted {
                break;
            }
            current_nonce += 1;
            admitted.push(tx);
        }
    }

    admitted.sort_by(|a, b| {
        a.from.as_str().cmp(b.from.as_str()).then(a.nonce.cmp(&b.nonce))
    });
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(from: &Address, nonce: u64, amount: u64, gas_fee: u64) -> Transaction {
        Transaction {
            tx_type: TxType::Transfer,
            from: from.clone(),
            to: Address::derive(b"recipient"),
            amount,
            gas_fee,
            nonce,
            timestamp: 1,
            data: vec![],
            signature: None,
            public_key: None,
        }
    }

    fn view(nonce: u64, available: u64) -> AccountView {
        AccountView { nonce, available_balance: available, staked_balance: 0 }
    }

    #[test]
    fn drops_duplicate_nonces_within_a_sender() {
        let alice = Address::derive(b"alice");
        let pending = vec![tx(&alice, 0, 10, 1), tx(&alice, 0, 999, 1)];
        let admitted = dedupe_and_admit(pending, |_| view(0, 1_000), 0, u64::MAX, usize::MAX);
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].amount, 10);
    }

    #[test]
    fn admits_a_sequential_run_starting_at_current_nonce() {
        let alice = Address::derive(b"alice");
        let pending = vec![tx(&alice, 0, 10, 1), tx(&alice, 1, 10, 1), tx(&alice, 2, 10, 1)];
        let admitted = dedupe_and_admit(pending, |_| view(0, 1_000), 0, u64::MAX, usize::MAX);
        assert_eq!(admitted.len(), 3);
        assert_eq!(admitted.iter().map(|t| t.nonce).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn stops_the_run_on_a_nonce_gap() {
        let alice = Address::derive(b"alice");
        let pending = vec![tx(&alice, 0, 10, 1), tx(&alice, 2, 10, 1)];
        let admitted = dedupe_and_admit(pending, |_| view(0, 1_000), 0, u64::MAX, usize::MAX);
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].nonce, 0);
    }

    #[test]
    fn stops_the_run_once_balance_is_exhausted() {
        let alice = Address::derive(b"alice");
        let pending = vec![tx(&alice, 0, 600, 1), tx(&alice, 1, 600, 1)];
        let admitted = dedupe_and_admit(pending, |_| view(0, 1_000), 0, u64::MAX, usize::MAX);
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].nonce, 0);
    }

    #[test]
    fn ignores_a_nonce_already_behind_current_nonce() {
        let alice = Address::derive(b"alice");
        let pending = vec![tx(&alice, 0, 10, 1), tx(&alice, 1, 10, 1)];
        // current_nonce is already 1: the 0-nonce entry is stale.
        let admitted = dedupe_and_admit(pending, |_| view(1, 1_000), 0, u64::MAX, usize::MAX);
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].nonce, 1);
    }

    #[test]
    fn result_is_ordered_by_sender_then_nonce() {
        let alice = Address::derive(b"alice");
        let bob = Address::derive(b"bob");
        let pending = vec![tx(&bob, 0, 10, 1), tx(&alice, 0, 10, 1)];
        let admitted = dedupe_and_admit(pending, |_| view(0, 1_000), 0, u64::MAX, usize::MAX);
        assert_eq!(admitted.len(), 2);
        assert!(admitted[0].from.as_str() <= admitted[1].from.as_str());
    }
}
