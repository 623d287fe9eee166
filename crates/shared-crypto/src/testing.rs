//! Deterministic fakes for [`crate::Signer`], [`crate::VrfProver`], and
//! [`crate::Aead`], for use in unit and integration tests only. None of
//! these offer real cryptographic guarantees; they exist so the rest of
//! the workspace can be exercised without the external collaborators.

use crate::errors::CryptoError;
use crate::traits::{Aead, Signer, VrfProver};
use shared_types::hash::{sha3_256, Hash};

/// A fake signer keyed by an arbitrary seed. The "public key" is the seed
/// itself, so `verify` can recompute the expected signature without a
/// separate keypair — adequate for tests, not for production.
#[derive(Debug, Clone)]
pub struct FakeSigner {
    seed: Vec<u8>,
}

impl FakeSigner {
    /// Build a fake signer from a seed. Different seeds produce different
    /// public keys and signatures.
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self { seed: seed.into() }
    }
}

impl Signer for FakeSigner {
    fn public_key(&self) -> Vec<u8> {
        self.seed.clone()
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        expected_signature(&self.seed, message).to_vec()
    }

    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        if expected_signature(public_key, message).as_slice() == signature {
            Ok(())
        } else {
            Err(CryptoError::InvalidSignature)
        }
    }
}

fn expected_signature(public_key: &[u8], message: &[u8]) -> Hash {
    let mut buf = Vec::with_capacity(public_key.len() + message.len());
    buf.extend_from_slice(public_key);
    buf.extend_from_slice(message);
    sha3_256(&buf)
}

/// A fake VRF prover, keyed the same way as [`FakeSigner`].
#[derive(Debug, Clone)]
pub struct FakeVrfProver {
    seed: Vec<u8>,
}

impl FakeVrfProver {
    /// Build a fake VRF prover from a seed.
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self { seed: seed.into() }
    }

    /// This prover's public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.seed.clone()
    }
}

impl VrfProver for FakeVrfProver {
    fn prove(&self, seed: &[u8]) -> (Vec<u8>, Hash) {
        let proof = expected_signature(&self.seed, seed).to_vec();
        let output = sha3_256(&proof);
        (proof, output)
    }

    fn verify(
        public_key: &[u8],
        seed: &[u8],
        proof: &[u8],
        output: &Hash,
    ) -> Result<(), CryptoError> {
        let expected_proof = expected_signature(public_key, seed);
        if expected_proof.as_slice() != proof {
            return Err(CryptoError::InvalidVrfProof);
        }
        if sha3_256(proof) != *output {
            return Err(CryptoError::InvalidVrfProof);
        }
        Ok(())
    }
}

/// A fake AEAD: a keyed byte-wise XOR stream. Not secure; deterministic
/// and reversible, which is all tests need.
#[derive(Debug, Clone)]
pub struct FakeAead {
    key: Vec<u8>,
}

impl FakeAead {
    /// Build a fake AEAD from a key.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, b)| b ^ self.key[i % self.key.len().max(1)])
            .collect()
    }
}

impl Aead for FakeAead {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.xor(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.xor(ciphertext))
    }
}
