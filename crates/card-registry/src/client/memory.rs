//! In-memory card service, suitable for tests and single-process demos.
//!
//! Mirrors the directory semantics a client relies on: cards are stored by
//! their content-addressed id, publishing the same snapshot twice is
//! rejected, publishing a rotation marks the previous card superseded, and
//! search returns every live card for an identity, unordered and unlinked.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::card::derive_card_id;
use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::{CardContent, SignedModel};
use crate::signer::ModelSigner;

use super::{CardClient, ClientResponse, ErrorResponse, GetCardResponse};

pub const CODE_NOT_FOUND: i64 = 40400;
pub const CODE_ALREADY_EXISTS: i64 = 40900;
pub const CODE_BAD_REQUEST: i64 = 40000;

struct StoredCard {
    identity: String,
    model: SignedModel,
    is_outdated: bool,
}

#[derive(Default)]
struct Directory {
    cards: HashMap<String, StoredCard>,
    /// Ids in publication order, for stable search results.
    order: Vec<String>,
    tokens: Vec<String>,
}

/// Card service held in process memory.
pub struct InMemoryCardClient<C: CardCrypto> {
    crypto: C,
    service_signer: Option<(String, C::PrivateKey)>,
    inner: Mutex<Directory>,
}

impl<C: CardCrypto> InMemoryCardClient<C> {
    pub fn new(crypto: C) -> Self {
        Self {
            crypto,
            service_signer: None,
            inner: Mutex::new(Directory::default()),
        }
    }

    /// Co-sign every published card as `signer`, like a directory service
    /// countersigning what it accepts.
    pub fn with_service_signer(mut self, signer: impl Into<String>, key: C::PrivateKey) -> Self {
        self.service_signer = Some((signer.into(), key));
        self
    }

    /// Every token presented to the service, in call order.
    pub fn received_tokens(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|dir| dir.tokens.clone())
            .unwrap_or_default()
    }

    /// Number of live cards.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|dir| dir.cards.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn directory(&self) -> Result<std::sync::MutexGuard<'_, Directory>> {
        self.inner
            .lock()
            .map_err(|_| CardError::Transport("card directory lock poisoned".into()))
    }

    fn failure<T>(code: i64, message: &str) -> Result<ClientResponse<T>> {
        Ok(ClientResponse::Failure(ErrorResponse {
            code,
            message: message.to_string(),
        }))
    }
}

impl<C> CardClient for InMemoryCardClient<C>
where
    C: CardCrypto,
    C::PrivateKey: Send + Sync,
{
    fn publish_card(
        &self,
        model: &SignedModel,
        token: &str,
    ) -> Result<ClientResponse<SignedModel>> {
        let mut dir = self.directory()?;
        dir.tokens.push(token.to_string());

        let Ok(content) = CardContent::decode(model.content_snapshot()) else {
            return Self::failure(CODE_BAD_REQUEST, "malformed content snapshot");
        };
        let id = derive_card_id(&self.crypto, model.content_snapshot())?;
        if dir.cards.contains_key(&id) {
            return Self::failure(CODE_ALREADY_EXISTS, "card already exists");
        }

        let stored = match &self.service_signer {
            Some((signer, key)) => ModelSigner::new(&self.crypto).sign(model, signer, key, None)?,
            None => model.clone(),
        };

        if let Some(previous) = content
            .previous_card_id
            .as_deref()
            .and_then(|previous_id| dir.cards.get_mut(previous_id))
        {
            previous.is_outdated = true;
        }

        dir.cards.insert(
            id.clone(),
            StoredCard {
                identity: content.identity,
                model: stored.clone(),
                is_outdated: false,
            },
        );
        dir.order.push(id);

        Ok(ClientResponse::Success(stored))
    }

    fn get_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<GetCardResponse>> {
        let mut dir = self.directory()?;
        dir.tokens.push(token.to_string());

        match dir.cards.get(card_id) {
            Some(card) => Ok(ClientResponse::Success(GetCardResponse {
                model: card.model.clone(),
                is_outdated: card.is_outdated,
            })),
            None => Self::failure(CODE_NOT_FOUND, "card not found"),
        }
    }

    fn search_cards(
        &self,
        identity: &str,
        token: &str,
    ) -> Result<ClientResponse<Vec<SignedModel>>> {
        let mut dir = self.directory()?;
        dir.tokens.push(token.to_string());

        let models = dir
            .order
            .iter()
            .filter_map(|id| dir.cards.get(id))
            .filter(|card| card.identity == identity)
            .map(|card| card.model.clone())
            .collect();
        Ok(ClientResponse::Success(models))
    }

    fn revoke_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<()>> {
        let mut dir = self.directory()?;
        dir.tokens.push(token.to_string());

        if dir.cards.remove(card_id).is_none() {
            return Self::failure(CODE_NOT_FOUND, "card not found");
        }
        dir.order.retain(|id| id != card_id);
        Ok(ClientResponse::Success(()))
    }
}
