//! Cryptographic collaborator for the card protocol.
//!
//! The card core never touches key material directly. Every sign, verify,
//! hash and key import/export goes through a [`CardCrypto`] implementation.
//! [`Ed25519Crypto`] is the default: Ed25519 signatures with SHA-512
//! content hashing.

pub mod ed25519;
pub mod keys;

pub use ed25519::Ed25519Crypto;
pub use keys::KeyPair;

use crate::error::Result;

/// Narrow crypto interface consumed by the card core.
pub trait CardCrypto: Send + Sync {
    /// Imported public-key handle.
    type PublicKey: Clone + std::fmt::Debug + Send + Sync;
    /// Private-key handle used for signing.
    type PrivateKey;

    /// Sign `data` with `private_key`.
    fn sign(&self, data: &[u8], private_key: &Self::PrivateKey) -> Result<Vec<u8>>;

    /// Verify `signature` over `data`. A well-formed but wrong signature
    /// returns `Ok(false)`.
    fn verify(&self, data: &[u8], signature: &[u8], public_key: &Self::PublicKey) -> Result<bool>;

    /// Hash `data`. The digest must be at least 32 bytes long.
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Import a public key from its exported byte form.
    fn import_public_key(&self, bytes: &[u8]) -> Result<Self::PublicKey>;

    /// Export a public key to bytes.
    fn export_public_key(&self, public_key: &Self::PublicKey) -> Result<Vec<u8>>;
}
