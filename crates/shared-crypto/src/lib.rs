//! # Shared Crypto
//!
//! The boundary this core shares with its cryptographic collaborators.
//!
//! ## Scope
//!
//! Per `spec.md` §1, the post-quantum signing primitive, VRF-from-signature
//! construction, and the symmetric AEAD for block-data payloads are all
//! external collaborators: this crate defines the [`Signer`], [`VrfProver`],
//! and [`Aead`] traits they implement, so that `consensus`, `block-producer`,
//! and `p2p-sync` can depend on a small interface instead of a concrete
//! scheme (`spec.md` §9, "prefer interface-based handles").
//!
//! A deterministic [`testing`] module provides fakes suitable for unit and
//! integration tests; it is not a production signer.

pub mod errors;
pub mod testing;
pub mod traits;

pub use errors::CryptoError;
pub use traits::{Aead, Signer, VrfProver};
