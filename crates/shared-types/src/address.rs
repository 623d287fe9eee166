//! Addresses: `F` + 36 Base36 characters encoding a 20-byte SHA3-256 digest
//! of a public key plus a 3-byte checksum of that digest.

use crate::errors::TypeError;
use crate::hash::sha3_256;
use serde::{Deserialize, Serialize};
use std::fmt;

const PREFIX: u8 = b'F';
const ENCODED_LEN: usize = 36;
const PAYLOAD_LEN: usize = 23; // 20-byte digest + 3-byte checksum
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fixed-length, printable chain address.
///
/// Invariant: `Address::validate(a.as_str())` holds for every `Address`
/// constructed through [`Address::derive`] or [`Address::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Derive the address bound to a public key.
    pub fn derive(public_key: &[u8]) -> Self {
        let digest = sha3_256(public_key);
        let digest20 = &digest[0..20];
        let checksum = checksum_of(digest20);

        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0..20].copy_from_slice(digest20);
        payload[20..23].copy_from_slice(&checksum);

        let encoded = base36_encode_fixed(&payload, ENCODED_LEN);
        let mut s = String::with_capacity(1 + ENCODED_LEN);
        s.push(PREFIX as char);
        s.push_str(&encoded);
        Address(s)
    }

    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if Self::validate(s) {
            Ok(Address(s.to_string()))
        } else {
            Err(TypeError::InvalidAddress(s.to_string()))
        }
    }

    /// Build an `Address` without re-validating. Callers must only use this
    /// for values already known to be well-formed (e.g. round-tripping from
    /// storage that only ever stored validated addresses).
    pub fn from_trusted(s: impl Into<String>) -> Self {
        Address(s.into())
    }

    /// Check that `s` has the right shape and an internally consistent
    /// checksum.
    pub fn validate(s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() != 1 + ENCODED_LEN || bytes[0] != PREFIX {
            return false;
        }
        let body = &s[1..];
        if !body.bytes().all(|b| ALPHABET.contains(&b)) {
            return false;
        }
        let Some(payload) = base36_decode_fixed(body, PAYLOAD_LEN) else {
            return false;
        };
        let digest20 = &payload[0..20];
        let checksum = &payload[20..23];
        checksum_of(digest20) == checksum
    }

    /// Borrow the underlying string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn checksum_of(digest20: &[u8]) -> [u8; 3] {
    let h = sha3_256(digest20);
    [h[0], h[1], h[2]]
}

/// Encode `bytes` (big-endian) as a fixed-width Base36 string, left-padded
/// with the zero digit. `bytes` is treated as one big unsigned integer.
fn base36_encode_fixed(bytes: &[u8], width: usize) -> String {
    let mut digits: Vec<u8> = bytes.to_vec();
    let mut out = Vec::with_capacity(width);

    // Repeated long division of the big-endian byte string by 36.
    while digits.iter().any(|&b| b != 0) {
        let mut remainder: u32 = 0;
        for d in digits.iter_mut() {
            let acc = (remainder << 8) | (*d as u32);
            *d = (acc / 36) as u8;
            remainder = acc % 36;
        }
        out.push(ALPHABET[remainder as usize]);
    }

    while out.len() < width {
        out.push(ALPHABET[0]);
    }
    out.reverse();
    // SAFETY: every byte pushed comes from `ALPHABET`, which is ASCII.
    String::from_utf8(out).expect("alphabet is ascii")
}

/// Decode a fixed-width Base36 string back into `out_len` bytes. Returns
/// `None` if `s` contains characters outside the alphabet or the decoded
/// value does not fit in `out_len` bytes.
fn base36_decode_fixed(s: &str, out_len: usize) -> Option<Vec<u8>> {
    let mut acc = vec![0u8; out_len];
    for ch in s.bytes() {
        let digit = ALPHABET.iter().position(|&c| c == ch)? as u32;
        let mut carry = digit;
        for byte in acc.iter_mut().rev() {
            let v = (*byte as u32) * 36 + carry;
            *byte = (v & 0xFF) as u8;
            carry = v >> 8;
        }
        if carry != 0 {
            return None; // overflowed out_len bytes
        }
    }
    Some(acc)
}

lazy_static::lazy_static! {
    /// The genesis account: source of the entire initial supply, sink for
    /// confiscated balances and `Transfer` gas fees, source of `Reward`
    /// transactions. Exempt from confiscation.
    static ref GENESIS_ADDRESS: Address = Address::derive(b"quantum-chain-genesis-account-v1");
}

/// The chain's genesis address.
pub fn genesis_address() -> Address {
    GENESIS_ADDRESS.clone()
}
