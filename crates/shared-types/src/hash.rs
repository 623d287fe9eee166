//! 32-byte SHA3-256 domain hash used throughout the chain.

use sha3::{Digest, Sha3_256};

/// A 32-byte SHA3-256 digest.
pub type Hash = [u8; 32];

/// Hash arbitrary bytes with SHA3-256.
pub fn sha3_256(data: &[u8]) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&out);
    hash
}

/// The zero hash, used as `previous_hash` for the genesis block.
pub const ZERO_HASH: Hash = [0u8; 32];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(sha3_256(b"abc"), sha3_256(b"abc"));
        assert_ne!(sha3_256(b"abc"), sha3_256(b"abd"));
    }
}
