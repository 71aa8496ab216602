//! Ed25519 + SHA-512 implementation of [`CardCrypto`].

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha512};

use super::keys::KeyPair;
use super::CardCrypto;
use crate::error::Result;

/// Default crypto collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Crypto;

impl Ed25519Crypto {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh issuer key pair.
    pub fn generate_key_pair(&self) -> KeyPair {
        KeyPair::generate()
    }
}

impl CardCrypto for Ed25519Crypto {
    type PublicKey = VerifyingKey;
    type PrivateKey = SigningKey;

    fn sign(&self, data: &[u8], private_key: &SigningKey) -> Result<Vec<u8>> {
        Ok(private_key.sign(data).to_bytes().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8], public_key: &VerifyingKey) -> Result<bool> {
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(public_key.verify(data, &signature).is_ok())
    }

    fn hash(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(Sha512::digest(data).to_vec())
    }

    fn import_public_key(&self, bytes: &[u8]) -> Result<VerifyingKey> {
        KeyPair::verifying_key_from_bytes(bytes)
    }

    fn export_public_key(&self, public_key: &VerifyingKey) -> Result<Vec<u8>> {
        Ok(public_key.to_bytes().to_vec())
    }
}
