//! Transactions and their canonical signing bytes.

use crate::address::{genesis_address, Address};
use crate::canonical::ByteBuilder;
use crate::errors::TypeError;
use crate::hash::Hash;
use serde::{Deserialize, Serialize};

/// The kind of state transition a transaction requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    /// Move funds from `from` to `to`, paying `gas_fee` to genesis.
    Transfer,
    /// Move `amount` from `available` to `staked` on `from`.
    Stake,
    /// Move `amount` from `staked` to `available` on `from`.
    Unstake,
    /// System transaction: mint a block reward from genesis to `to`.
    Reward,
    /// System transaction: confiscate a forged signer's balance to genesis.
    Slash,
}

/// A transaction, as submitted by a client or synthesized by the producer
/// for `Reward`/`Slash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// The kind of state transition requested.
    pub tx_type: TxType,
    /// Sender. For `Reward`/`Slash` this is always the genesis address.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Amount moved, minor units.
    pub amount: u64,
    /// Gas fee paid to genesis. Must be zero except for `Transfer`.
    pub gas_fee: u64,
    /// Sequence number assigned by the accepting validator at admission.
    /// Not covered by the signature.
    pub nonce: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Optional payload, size-bounded by `max_data_size`.
    pub data: Vec<u8>,
    /// Signature over [`Transaction::signing_bytes`]. Absent for system
    /// transactions (`Reward`, `Slash`).
    pub signature: Option<Vec<u8>>,
    /// Public key whose derived address must equal `from`. Absent for
    /// system transactions.
    pub public_key: Option<Vec<u8>>,
}

impl Transaction {
    /// Bytes that are signed: everything except `nonce` and `signature`.
    pub fn signing_bytes(&self) -> Vec<u8> {
        ByteBuilder::new()
            .u8(tx_type_tag(self.tx_type))
            .str(self.from.as_str())
            .str(self.to.as_str())
            .u64(self.amount)
            .u64(self.gas_fee)
            .u64(self.timestamp)
            .var_bytes(&self.data)
            .var_bytes(self.public_key.as_deref().unwrap_or(&[]))
            .finish()
    }

    /// A content hash used for the `tx_hash → tx` index. Unlike
    /// `signing_bytes`, this includes the nonce and signature so that two
    /// transactions that only differ in nonce hash differently.
    pub fn hash(&self) -> Hash {
        let bytes = ByteBuilder::new()
            .bytes(&self.signing_bytes())
            .u64(self.nonce)
            .var_bytes(self.signature.as_deref().unwrap_or(&[]))
            .finish();
        crate::hash::sha3_256(&bytes)
    }

    /// Whether this transaction type is executed by the state engine
    /// without a signature (`Reward`, `Slash`).
    pub fn is_system(&self) -> bool {
        matches!(self.tx_type, TxType::Reward | TxType::Slash)
    }

    /// Structural validation per §3, independent of signature verification
    /// (which requires the external signing collaborator) and independent
    /// of account balances (checked by the state engine during execution).
    pub fn validate_structure(
        &self,
        min_gas_fee: u64,
        max_gas_fee: u64,
        max_data_size: usize,
    ) -> Result<(), TypeError> {
        if self.data.len() > max_data_size {
            return Err(TypeError::DataTooLarge {
                actual: self.data.len(),
                max: max_data_size,
            });
        }

        match self.tx_type {
            TxType::Transfer => {
                if !(min_gas_fee..=max_gas_fee).contains(&self.gas_fee) {
                    return Err(TypeError::GasFeeOutOfRange {
                        fee: self.gas_fee,
                        min: min_gas_fee,
                        max: max_gas_fee,
                    });
                }
                if self.from == self.to {
                    return Err(TypeError::SelfTransferForbidden(self.tx_type));
                }
            }
            TxType::Stake | TxType::Unstake => {
                if self.gas_fee != 0 {
                    return Err(TypeError::InvalidTransaction(
                        "gas_fee must be zero for Stake/Unstake".into(),
                    ));
                }
                // from == to is permitted: staking moves funds within one account.
            }
            TxType::Reward | TxType::Slash => {
                if self.gas_fee != 0 {
                    return Err(TypeError::InvalidTransaction(
                        "gas_fee must be zero for system transactions".into(),
                    ));
                }
                if self.from != genesis_address() && self.to != genesis_address() {
                    return Err(TypeError::InvalidTransaction(
                        "system transactions must touch genesis".into(),
                    ));
                }
                if self.from == self.to && self.from != genesis_address() {
                    return Err(TypeError::SelfTransferForbidden(self.tx_type));
                }
            }
        }
        Ok(())
    }
}

fn tx_type_tag(t: TxType) -> u8 {
    match t {
        TxType::Transfer => 0,
        TxType::Stake => 1,
        TxType::Unstake => 2,
        TxType::Reward => 3,
        TxType::Slash => 4,
    }
}
