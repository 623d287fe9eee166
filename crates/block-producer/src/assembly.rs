//! Block assembly (§4.4 steps 6-7): header construction, the VRF
//! proof/output over `previous_hash ‖ be64(height)`, the synthesized
//! `Reward` transaction, the tx-root, and the optional encrypted `data`
//! attachment under the size threshold.

use shared_crypto::{Aead, Signer, VrfProver};
use shared_types::canonical::ByteBuilder;
use shared_types::{Address, Block, BlockHeader, RealBlock, Transaction, TxType};

/// The VRF seed for height `height`: `previous_hash ‖ be64(height)`.
pub fn vrf_seed(previous_hash: shared_types::Hash, height: u64) -> Vec<u8> {
    ByteBuilder::new().bytes(&previous_hash).u64(height).finish()
}

/// Build the synthesized block reward transaction, minted from genesis to
/// `proposer`.
pub fn reward_transaction(genesis: Address, proposer: Address, amount: u64, timestamp: u64) -> Transaction {
    Transaction {
        tx_type: TxType::Reward,
        from: genesis,
        to: proposer,
        amount,
        gas_fee: 0,
        nonce: 0,
        timestamp,
        data: vec![],
        signature: None,
        public_key: None,
    }
}

/// Assemble an unsigned header and body: `prev`'s height and hash, the
/// admitted `transactions` (already including the reward transaction),
/// and the VRF artifacts. `state_root` is computed by the caller after
/// strict execution (it is not known until the block's transactions have
/// actually run).
#[allow(clippy::too_many_arguments)]
pub fn assemble<V: VrfProver>(
    prev: &Block,
    proposer: Address,
    timestamp: u64,
    transactions: Vec<Transaction>,
    state_root: shared_types::Hash,
    vrf_prover: &V,
) -> RealBlock {
    let height = prev.height() + 1;
    let seed = vrf_seed(prev.hash(), height);
    let (vrf_proof, vrf_output) = vrf_prover.prove(&seed);

    let header = BlockHeader {
        height,
        previous_hash: prev.hash(),
        timestamp,
        state_root,
        tx_root: shared_types::merkle::merkle_root(
            &transactions.iter().map(Transaction::hash).collect::<Vec<_>>(),
        ),
        proposer,
        vrf_proof,
        vrf_output,
        signature: Vec::new(),
    };

    RealBlock { header, transactions, data: None }
}

/// Sign the assembled block's header in place.
pub fn sign<S: Signer>(block: &mut RealBlock, signer: &S) {
    block.header.signature = signer.sign(&block.header.signing_bytes());
}

/// Whether an encrypted `data` payload may be attached: both the
/// serialized size *before* attaching it and the size *after* must fit
/// within `max_block_size`, and the pre-attachment size must be under
/// `data_threshold_percent` of it.
pub fn data_fits(
    serialized_size_before: u64,
    encrypted_len: u64,
    max_block_size: u64,
    data_threshold_percent: u8,
) -> bool {
    let threshold = max_block_size * data_threshold_percent as u64 / 100;
    serialized_size_before < threshold && serialized_size_before + encrypted_len <= max_block_size
}

/// Attach `plaintext`, encrypted under `aead`, to `block.data` if it fits
/// per [`data_fits`]. `serialized_size_before` is the block's encoded size
/// without `data`.
pub fn try_attach_data<A: Aead>(
    block: &mut RealBlock,
    plaintext: &[u8],
    aead: &A,
    serialized_size_before: u64,
    max_block_size: u64,
    data_threshold_percent: u8,
) {
    let ciphertext = aead.encrypt(plaintext);
    if data_fits(serialized_size_before, ciphertext.len() as u64, max_block_size, data_threshold_percent) {
        block.data = Some(ciphertext);
    }
}
