//! Card manager, the high-level card API.
//!
//! Ties the pieces together: builds and self-signs raw cards, obtains one
//! access token per network call, talks to the card service through a
//! [`CardClient`], parses responses into [`Card`]s, runs the configured
//! [`CardVerifier`], and links search results into rotation chains.

use crate::auth::provider::{
    OPERATION_GET, OPERATION_PUBLISH, OPERATION_REVOKE, OPERATION_SEARCH,
};
use crate::auth::{AccessTokenProvider, Jwt, TokenContext};
use crate::card::{self, link_cards, Card, CardParams};
use crate::client::CardClient;
use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::{CardContent, SignedModel, CARD_VERSION};
use crate::signer::ModelSigner;
use crate::verification::{CardVerifier, NullCardVerifier};

/// Extra signing step applied to a raw card before it is published.
pub type SignCallback = Box<dyn Fn(SignedModel) -> Result<SignedModel> + Send + Sync>;

/// What [`CardManager::generate_raw_card`] does when the self signature
/// cannot be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfSignFailure {
    /// Return the crypto error.
    #[default]
    Propagate,
    /// Log a warning and return the model without a self signature.
    Suppress,
}

/// Builder for [`CardManager`].
pub struct CardManagerBuilder<C: CardCrypto> {
    crypto: C,
    token_provider: Option<Box<dyn AccessTokenProvider>>,
    card_client: Option<Box<dyn CardClient>>,
    verifier: Option<Box<dyn CardVerifier<C::PublicKey>>>,
    sign_callback: Option<SignCallback>,
    self_sign_failure: SelfSignFailure,
}

impl<C: CardCrypto> CardManagerBuilder<C> {
    pub fn new(crypto: C) -> Self {
        Self {
            crypto,
            token_provider: None,
            card_client: None,
            verifier: None,
            sign_callback: None,
            self_sign_failure: SelfSignFailure::default(),
        }
    }

    pub fn token_provider(mut self, provider: impl AccessTokenProvider + 'static) -> Self {
        self.token_provider = Some(Box::new(provider));
        self
    }

    pub fn card_client(mut self, client: impl CardClient + 'static) -> Self {
        self.card_client = Some(Box::new(client));
        self
    }

    /// Defaults to [`NullCardVerifier`].
    pub fn verifier(mut self, verifier: impl CardVerifier<C::PublicKey> + 'static) -> Self {
        self.verifier = Some(Box::new(verifier));
        self
    }

    /// Run `callback` on every raw card before it is sent to the service,
    /// typically to add an application signature.
    pub fn sign_callback(
        mut self,
        callback: impl Fn(SignedModel) -> Result<SignedModel> + Send + Sync + 'static,
    ) -> Self {
        self.sign_callback = Some(Box::new(callback));
        self
    }

    pub fn self_sign_failure(mut self, policy: SelfSignFailure) -> Self {
        self.self_sign_failure = policy;
        self
    }

    /// Fails with [`CardError::Configuration`] when the token provider or
    /// card client is missing.
    pub fn build(self) -> Result<CardManager<C>> {
        let token_provider = self
            .token_provider
            .ok_or_else(|| CardError::Configuration("access token provider is required".into()))?;
        let card_client = self
            .card_client
            .ok_or_else(|| CardError::Configuration("card client is required".into()))?;

        Ok(CardManager {
            crypto: self.crypto,
            token_provider,
            card_client,
            verifier: self
                .verifier
                .unwrap_or_else(|| Box::new(NullCardVerifier)),
            sign_callback: self.sign_callback,
            self_sign_failure: self.self_sign_failure,
        })
    }
}

/// Issues, publishes, fetches, searches, revokes, imports and exports cards.
pub struct CardManager<C: CardCrypto> {
    crypto: C,
    token_provider: Box<dyn AccessTokenProvider>,
    card_client: Box<dyn CardClient>,
    verifier: Box<dyn CardVerifier<C::PublicKey>>,
    sign_callback: Option<SignCallback>,
    self_sign_failure: SelfSignFailure,
}

impl<C: CardCrypto> CardManager<C> {
    pub fn builder(crypto: C) -> CardManagerBuilder<C> {
        CardManagerBuilder::new(crypto)
    }

    pub fn crypto(&self) -> &C {
        &self.crypto
    }

    /// Build a self-signed raw card stamped with the current time.
    pub fn generate_raw_card(&self, params: &CardParams<'_, C>) -> Result<SignedModel> {
        let identity = params.require_identity()?;
        let public_key = self.crypto.export_public_key(params.public_key)?;
        let snapshot = CardContent::encode(
            identity,
            &public_key,
            CARD_VERSION,
            crate::time::now_secs(),
            params.previous_card_id.as_deref(),
        )?;
        let model = SignedModel::new(snapshot, Vec::new());

        let signed = ModelSigner::new(&self.crypto).self_sign(
            &model,
            params.private_key,
            params.extra_fields.as_ref(),
        );
        match (signed, self.self_sign_failure) {
            (Ok(signed), _) => Ok(signed),
            (Err(e), SelfSignFailure::Suppress) => {
                log::warn!("self signature for {identity} failed, returning unsigned card: {e}");
                Ok(model)
            }
            (Err(e), SelfSignFailure::Propagate) => Err(e),
        }
    }

    /// Generate, sign and publish a new card.
    ///
    /// The published card carries the identity of the access token, which
    /// may differ from `params.identity`.
    pub fn publish_card(&self, params: &CardParams<'_, C>) -> Result<Card<C::PublicKey>> {
        let identity = params.require_identity()?;
        let token = self.token(identity, OPERATION_PUBLISH)?;

        let params = CardParams {
            public_key: params.public_key,
            private_key: params.private_key,
            identity: Some(token.identity().to_string()),
            previous_card_id: params.previous_card_id.clone(),
            extra_fields: params.extra_fields.clone(),
        };
        let model = self.generate_raw_card(&params)?;
        self.publish_with_token(model, &token)
    }

    /// Publish a model built elsewhere. The token is requested for the
    /// identity inside its content snapshot.
    pub fn publish_raw_signed_model(&self, model: &SignedModel) -> Result<Card<C::PublicKey>> {
        let content = CardContent::decode(model.content_snapshot())?;
        let token = self.token(&content.identity, OPERATION_PUBLISH)?;
        self.publish_with_token(model.clone(), &token)
    }

    /// Fetch a card by id. The service's supersession flag is kept on the
    /// returned card.
    pub fn get_card(&self, card_id: &str) -> Result<Card<C::PublicKey>> {
        let token = self.token("", OPERATION_GET)?;
        let response = self
            .card_client
            .get_card(card_id, &token.to_string())?
            .into_result()?;
        let card = self.parse_card(&response.model, response.is_outdated)?;
        if card.id != card_id {
            log::warn!("requested card {card_id}, service returned {}", card.id);
        }
        self.verified(card)
    }

    /// All cards for `identity`, with rotations linked to their previous
    /// card. Any card failing to parse or verify aborts the search.
    pub fn search_cards(&self, identity: &str) -> Result<Vec<Card<C::PublicKey>>> {
        let token = self.token(identity, OPERATION_SEARCH)?;
        let models = self
            .card_client
            .search_cards(identity, &token.to_string())?
            .into_result()?;
        log::debug!("search for {identity} returned {} cards", models.len());

        let cards = models
            .iter()
            .map(|model| self.parse_card(model, false).and_then(|c| self.verified(c)))
            .collect::<Result<Vec<_>>>()?;
        Ok(link_cards(cards))
    }

    pub fn revoke_card(&self, card_id: &str) -> Result<()> {
        let token = self.token("", OPERATION_REVOKE)?;
        self.card_client
            .revoke_card(card_id, &token.to_string())?
            .into_result()?;
        log::debug!("revoked card {card_id}");
        Ok(())
    }

    /// Parse and verify a card received out of band.
    pub fn import_card(&self, model: &SignedModel) -> Result<Card<C::PublicKey>> {
        self.verified(self.parse_card(model, false)?)
    }

    /// Import from the base64 export form.
    pub fn import_card_from_string(&self, encoded: &str) -> Result<Card<C::PublicKey>> {
        self.import_card(&SignedModel::from_base64(encoded)?)
    }

    pub fn import_card_from_json(&self, json: &str) -> Result<Card<C::PublicKey>> {
        self.import_card(&SignedModel::from_json(json)?)
    }

    pub fn export_card_as_raw_card(&self, card: &Card<C::PublicKey>) -> SignedModel {
        card.to_signed_model()
    }

    pub fn export_card_as_string(&self, card: &Card<C::PublicKey>) -> Result<String> {
        card.to_signed_model().to_base64()
    }

    pub fn export_card_as_json(&self, card: &Card<C::PublicKey>) -> Result<String> {
        card.to_signed_model().to_json()
    }

    /// Parse without verifying.
    pub fn parse_card(&self, model: &SignedModel, is_outdated: bool) -> Result<Card<C::PublicKey>> {
        card::parse_card(&self.crypto, model, is_outdated)
    }

    fn token(&self, identity: &str, operation: &str) -> Result<Jwt> {
        log::debug!("requesting {operation} token for '{identity}'");
        self.token_provider
            .get_token(&TokenContext::new(identity, operation))
    }

    fn publish_with_token(&self, model: SignedModel, token: &Jwt) -> Result<Card<C::PublicKey>> {
        let model = match &self.sign_callback {
            Some(callback) => callback(model)?,
            None => model,
        };
        let published = self
            .card_client
            .publish_card(&model, &token.to_string())?
            .into_result()?;
        let card = self.verified(self.parse_card(&published, false)?)?;
        log::debug!("published card {} for {}", card.id, card.identity);
        Ok(card)
    }

    fn verified(&self, card: Card<C::PublicKey>) -> Result<Card<C::PublicKey>> {
        if !self.verifier.verify_card(&card) {
            return Err(CardError::Verification(format!(
                "card {} was rejected by the verifier",
                card.id
            )));
        }
        Ok(card)
    }
}
