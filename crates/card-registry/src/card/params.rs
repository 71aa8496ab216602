//! Parameters for issuing a new card.

use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::ExtraFields;

/// Inputs to card generation and publishing.
pub struct CardParams<'a, C: CardCrypto> {
    pub public_key: &'a C::PublicKey,
    pub private_key: &'a C::PrivateKey,
    pub identity: Option<String>,
    pub previous_card_id: Option<String>,
    pub extra_fields: Option<ExtraFields>,
}

impl<'a, C: CardCrypto> CardParams<'a, C> {
    /// Start from the issuer's key pair.
    pub fn new(public_key: &'a C::PublicKey, private_key: &'a C::PrivateKey) -> Self {
        Self {
            public_key,
            private_key,
            identity: None,
            previous_card_id: None,
            extra_fields: None,
        }
    }

    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Mark the new card as the rotation of `previous_card_id`.
    pub fn previous_card_id(mut self, previous_card_id: impl Into<String>) -> Self {
        self.previous_card_id = Some(previous_card_id.into());
        self
    }

    pub fn extra_fields(mut self, extra_fields: ExtraFields) -> Self {
        self.extra_fields = Some(extra_fields);
        self
    }

    /// The identity, or a configuration error when none was given.
    pub fn require_identity(&self) -> Result<&str> {
        self.identity
            .as_deref()
            .ok_or_else(|| CardError::Configuration("card identity is required".into()))
    }
}
