//! Errors surfaced by the cryptographic collaborator seams.

use thiserror::Error;

/// Errors produced by a [`crate::Signer`], [`crate::VrfProver`], or
/// [`crate::Aead`] implementation.
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// Signature did not verify against the claimed public key.
    #[error("signature verification failed")]
    InvalidSignature,

    /// A VRF proof did not verify against the claimed public key and seed.
    #[error("VRF proof verification failed")]
    InvalidVrfProof,

    /// Decryption failed (tampered ciphertext or wrong key).
    #[error("AEAD decryption failed")]
    DecryptionFailed,

    /// The underlying key material was malformed.
    #[error("malformed key material: {0}")]
    MalformedKey(String),
}
