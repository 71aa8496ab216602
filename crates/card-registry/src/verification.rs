//! Card verification.
//!
//! The manager runs every card it parses through a [`CardVerifier`]. The
//! default [`NullCardVerifier`] accepts everything; [`SignatureCardVerifier`]
//! checks the issuer's self signature and any trusted co-signers.

use crate::card::Card;
use crate::crypto::CardCrypto;
use crate::signer::{signed_bytes, SELF_SIGNER};

/// Decides whether a parsed card is acceptable.
pub trait CardVerifier<K>: Send + Sync {
    fn verify_card(&self, card: &Card<K>) -> bool;
}

/// Accepts every card.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCardVerifier;

impl<K> CardVerifier<K> for NullCardVerifier {
    fn verify_card(&self, _card: &Card<K>) -> bool {
        true
    }
}

/// Verifies signatures on a card with the crypto collaborator.
pub struct SignatureCardVerifier<C: CardCrypto> {
    crypto: C,
    verify_self_signature: bool,
    trusted_signers: Vec<(String, C::PublicKey)>,
}

impl<C: CardCrypto> SignatureCardVerifier<C> {
    /// A verifier that requires a valid self signature and nothing else.
    pub fn new(crypto: C) -> Self {
        Self {
            crypto,
            verify_self_signature: true,
            trusted_signers: Vec::new(),
        }
    }

    pub fn verify_self_signature(mut self, enabled: bool) -> Self {
        self.verify_self_signature = enabled;
        self
    }

    /// Require a valid signature from `signer` made with `public_key`.
    pub fn trusted_signer(mut self, signer: impl Into<String>, public_key: C::PublicKey) -> Self {
        self.trusted_signers.push((signer.into(), public_key));
        self
    }

    fn has_valid_signature(
        &self,
        card: &Card<C::PublicKey>,
        signer: &str,
        public_key: &C::PublicKey,
    ) -> bool {
        let Some(signature) = card.signature_by(signer) else {
            log::debug!("card {} has no signature from {signer}", card.id);
            return false;
        };
        let to_verify = signed_bytes(&card.content_snapshot, signature.snapshot.as_deref());
        match self
            .crypto
            .verify(&to_verify, &signature.signature, public_key)
        {
            Ok(valid) => valid,
            Err(e) => {
                log::debug!("signature check for {signer} on card {} failed: {e}", card.id);
                false
            }
        }
    }
}

impl<C: CardCrypto> CardVerifier<C::PublicKey> for SignatureCardVerifier<C> {
    fn verify_card(&self, card: &Card<C::PublicKey>) -> bool {
        if self.verify_self_signature
            && !self.has_valid_signature(card, SELF_SIGNER, &card.public_key)
        {
            return false;
        }

        self.trusted_signers
            .iter()
            .all(|(signer, key)| self.has_valid_signature(card, signer, key))
    }
}
