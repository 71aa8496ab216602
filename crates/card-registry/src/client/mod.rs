//! Card service client interface.
//!
//! A [`CardClient`] performs one round trip per call and reports either the
//! parsed payload or the service's error envelope. Transport failures are
//! returned as `Err(CardError::Transport)`.

pub mod http;
pub mod memory;

pub use http::{HttpCardClient, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use memory::InMemoryCardClient;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};
use crate::model::SignedModel;

/// Error envelope returned by the card service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i64,
    pub message: String,
}

/// Outcome of a card service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientResponse<T> {
    Success(T),
    Failure(ErrorResponse),
}

impl<T> ClientResponse<T> {
    /// Map an error envelope to [`CardError::Client`].
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(CardError::Client {
                code: error.code,
                message: error.message,
            }),
        }
    }
}

/// A fetched card with the service's supersession flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCardResponse {
    pub model: SignedModel,
    pub is_outdated: bool,
}

/// Card service operations. The token is the rendered access token.
pub trait CardClient: Send + Sync {
    fn publish_card(&self, model: &SignedModel, token: &str) -> Result<ClientResponse<SignedModel>>;

    fn get_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<GetCardResponse>>;

    fn search_cards(
        &self,
        identity: &str,
        token: &str,
    ) -> Result<ClientResponse<Vec<SignedModel>>>;

    fn revoke_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<()>>;
}

impl<T: CardClient + ?Sized> CardClient for Arc<T> {
    fn publish_card(
        &self,
        model: &SignedModel,
        token: &str,
    ) -> Result<ClientResponse<SignedModel>> {
        (**self).publish_card(model, token)
    }

    fn get_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<GetCardResponse>> {
        (**self).get_card(card_id, token)
    }

    fn search_cards(
        &self,
        identity: &str,
        token: &str,
    ) -> Result<ClientResponse<Vec<SignedModel>>> {
        (**self).search_cards(identity, token)
    }

    fn revoke_card(&self, card_id: &str, token: &str) -> Result<ClientResponse<()>> {
        (**self).revoke_card(card_id, token)
    }
}
