//! Model signer: appends named signatures to a [`SignedModel`].
//!
//! The signed bytes are the content snapshot followed by the canonical JSON
//! of any extra fields. The extra-field bytes are stored verbatim as the
//! signature's snapshot so verifiers can rebuild the exact input.

use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::{canonical_json, ExtraFields, RawSignature, SignedModel};

/// Signer id reserved for the card issuer's own signature.
pub const SELF_SIGNER: &str = "self";

/// Bytes covered by a signature entry.
pub fn signed_bytes(content_snapshot: &[u8], snapshot: Option<&[u8]>) -> Vec<u8> {
    let mut to_sign = content_snapshot.to_vec();
    if let Some(snapshot) = snapshot {
        to_sign.extend_from_slice(snapshot);
    }
    to_sign
}

/// Signs models through the crypto collaborator.
pub struct ModelSigner<'a, C: CardCrypto> {
    crypto: &'a C,
}

impl<'a, C: CardCrypto> ModelSigner<'a, C> {
    pub fn new(crypto: &'a C) -> Self {
        Self { crypto }
    }

    /// Append the issuer's `"self"` signature.
    pub fn self_sign(
        &self,
        model: &SignedModel,
        private_key: &C::PrivateKey,
        extra_fields: Option<&ExtraFields>,
    ) -> Result<SignedModel> {
        self.append(model, SELF_SIGNER, private_key, extra_fields)
    }

    /// Append a signature under an explicit signer id.
    ///
    /// `"self"` is reserved for [`ModelSigner::self_sign`] and is rejected
    /// with [`CardError::Configuration`].
    pub fn sign(
        &self,
        model: &SignedModel,
        signer: &str,
        private_key: &C::PrivateKey,
        extra_fields: Option<&ExtraFields>,
    ) -> Result<SignedModel> {
        if signer == SELF_SIGNER {
            return Err(CardError::Configuration(format!(
                "signer id \"{SELF_SIGNER}\" is reserved for self-signing"
            )));
        }
        self.append(model, signer, private_key, extra_fields)
    }

    fn append(
        &self,
        model: &SignedModel,
        signer: &str,
        private_key: &C::PrivateKey,
        extra_fields: Option<&ExtraFields>,
    ) -> Result<SignedModel> {
        let snapshot = extra_fields.map(canonical_json).transpose()?;
        let to_sign = signed_bytes(model.content_snapshot(), snapshot.as_deref());
        let signature = self.crypto.sign(&to_sign, private_key)?;

        Ok(model.with_signature(RawSignature::new(signer, signature, snapshot)))
    }
}
