//! Trait seams implemented by the external cryptographic collaborators.

use crate::errors::CryptoError;
use shared_types::hash::Hash;

/// Signs and verifies the canonical byte strings this core produces
/// (transaction signing bytes, block header signing bytes, checkpoint
/// signing bytes). Backed externally by a post-quantum signature scheme.
pub trait Signer: Send + Sync {
    /// This signer's public key, in its scheme's native encoding.
    fn public_key(&self) -> Vec<u8>;

    /// Sign `message`, returning the scheme's native signature encoding.
    fn sign(&self, message: &[u8]) -> Vec<u8>;

    /// Verify `signature` over `message` under `public_key`.
    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError>
    where
        Self: Sized;
}

/// Produces and verifies VRF proofs derived from a signature scheme
/// (VRF-from-signature, an external collaborator per `spec.md` §1).
pub trait VrfProver: Send + Sync {
    /// Compute `(proof, output)` over `seed`.
    fn prove(&self, seed: &[u8]) -> (Vec<u8>, Hash);

    /// Verify that `proof` over `seed` under `public_key` yields `output`.
    fn verify(public_key: &[u8], seed: &[u8], proof: &[u8], output: &Hash)
        -> Result<(), CryptoError>;
}

/// Encrypts and decrypts the optional block-level `data` payload. Backed
/// externally by a symmetric AEAD.
pub trait Aead: Send + Sync {
    /// Encrypt `plaintext` under this instance's key.
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8>;

    /// Decrypt `ciphertext` produced by [`Aead::encrypt`].
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;
}
