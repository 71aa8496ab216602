//! Ed25519 key pair generation for card issuers.

use ed25519_dalek::{SigningKey, VerifyingKey};

use crate::error::{CardError, Result};

/// An Ed25519 key pair used to issue and self-sign cards.
///
/// Key material is cleared by `SigningKey`'s own zeroize-on-drop.
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey> {
        let key_bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CardError::Crypto("public key must be 32 bytes".into()))?;
        VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| CardError::Crypto(format!("invalid public key: {e}")))
    }

    /// Return a reference to the signing key.
    pub fn private_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn public_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the verifying key bytes.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }
}
