//! Card: a signed, content-addressed binding of an identity to a public key.

use ed25519_dalek::VerifyingKey;

use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::extra::parse_extra_fields;
use crate::model::{CardContent, ExtraFields, RawSignature, SignedModel};

use super::id::derive_card_id;

/// A signature attached to a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSignature {
    pub signer: String,
    pub signature: Vec<u8>,
    /// Signed side-channel bytes, if any.
    pub snapshot: Option<Vec<u8>>,
    /// `snapshot` parsed as a key/value mapping.
    pub extra_fields: Option<ExtraFields>,
}

impl CardSignature {
    /// Build from a wire signature, parsing its snapshot when present.
    pub fn from_raw(raw: &RawSignature) -> Self {
        let extra_fields = raw.snapshot.as_deref().and_then(|snapshot| {
            parse_extra_fields(snapshot)
                .map_err(|e| {
                    log::warn!("signature snapshot from {} is not a mapping: {e}", raw.signer)
                })
                .ok()
        });

        Self {
            signer: raw.signer.clone(),
            signature: raw.signature.clone(),
            snapshot: raw.snapshot.clone(),
            extra_fields,
        }
    }

    /// Convert back to the wire form.
    pub fn to_raw(&self) -> RawSignature {
        RawSignature::new(
            self.signer.clone(),
            self.signature.clone(),
            self.snapshot.clone(),
        )
    }
}

/// A parsed card. `K` is the crypto collaborator's public-key handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Card<K = VerifyingKey> {
    /// 64 lowercase hex characters derived from `content_snapshot`.
    pub id: String,
    pub identity: String,
    pub public_key: K,
    pub version: String,
    /// Unix seconds.
    pub created_at: u64,
    pub is_outdated: bool,
    pub signatures: Vec<CardSignature>,
    /// Exact bytes hashed for `id` and covered by every signature.
    pub content_snapshot: Vec<u8>,
    pub previous_card_id: Option<String>,
    /// Set only by chain linking. Never chained further.
    pub previous_card: Option<Box<Card<K>>>,
}

impl<K: Clone> Card<K> {
    /// Copy of this card marked as superseded, with no chain of its own.
    pub fn as_outdated_previous(&self) -> Self {
        Self {
            is_outdated: true,
            previous_card: None,
            ..self.clone()
        }
    }

    /// This card with `previous` attached as its previous card.
    pub fn with_previous(self, previous: &Card<K>) -> Self {
        Self {
            previous_card: Some(Box::new(previous.as_outdated_previous())),
            ..self
        }
    }

    /// Look up a signature by signer id.
    pub fn signature_by(&self, signer: &str) -> Option<&CardSignature> {
        self.signatures.iter().find(|s| s.signer == signer)
    }

    /// Creation time rendered as RFC 3339 UTC.
    pub fn created_at_rfc3339(&self) -> String {
        crate::time::secs_to_rfc3339(self.created_at)
    }

    /// Rebuild the wire model from the stored snapshot and signatures.
    pub fn to_signed_model(&self) -> SignedModel {
        SignedModel::new(
            self.content_snapshot.clone(),
            self.signatures.iter().map(CardSignature::to_raw).collect(),
        )
    }
}

/// Parse a wire model into a card.
///
/// The identifier is hashed from the received snapshot bytes, never from a
/// re-encoding of the parsed content.
pub fn parse_card<C: CardCrypto>(
    crypto: &C,
    model: &SignedModel,
    is_outdated: bool,
) -> Result<Card<C::PublicKey>> {
    let snapshot = model.content_snapshot();
    let content = CardContent::decode(snapshot)?;
    let created_at = content
        .created_at
        .ok_or_else(|| CardError::Format("content snapshot missing created_at".into()))?;
    let public_key = crypto.import_public_key(&content.public_key_bytes()?)?;

    Ok(Card {
        id: derive_card_id(crypto, snapshot)?,
        identity: content.identity,
        public_key,
        version: content.version,
        created_at,
        is_outdated,
        signatures: model
            .signatures()
            .iter()
            .map(CardSignature::from_raw)
            .collect(),
        content_snapshot: snapshot.to_vec(),
        previous_card_id: content.previous_card_id,
        previous_card: None,
    })
}
