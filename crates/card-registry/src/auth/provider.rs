//! Access token providers.
//!
//! The manager asks for one token per network call, scoped to the identity
//! and operation it is about to perform. Providers decide where the token
//! comes from: a fixed value, a callback to a backend, or a local generator.

use std::sync::Arc;

use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::ExtraFields;

use super::jwt::{Jwt, JwtGenerator};

pub const OPERATION_PUBLISH: &str = "publish";
pub const OPERATION_GET: &str = "get";
pub const OPERATION_SEARCH: &str = "search";
pub const OPERATION_REVOKE: &str = "revoke";

/// What a token is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContext {
    /// Empty when the operation is not bound to a known identity.
    pub identity: String,
    pub operation: String,
}

impl TokenContext {
    pub fn new(identity: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            operation: operation.into(),
        }
    }
}

/// Source of access tokens.
pub trait AccessTokenProvider: Send + Sync {
    fn get_token(&self, context: &TokenContext) -> Result<Jwt>;
}

impl<T: AccessTokenProvider + ?Sized> AccessTokenProvider for Arc<T> {
    fn get_token(&self, context: &TokenContext) -> Result<Jwt> {
        (**self).get_token(context)
    }
}

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct ConstAccessTokenProvider {
    token: Jwt,
}

impl ConstAccessTokenProvider {
    pub fn new(token: Jwt) -> Self {
        Self { token }
    }
}

impl AccessTokenProvider for ConstAccessTokenProvider {
    fn get_token(&self, _context: &TokenContext) -> Result<Jwt> {
        Ok(self.token.clone())
    }
}

/// Obtains a token string from a callback, typically a request to the
/// application backend.
pub struct CallbackJwtProvider<F> {
    callback: F,
}

impl<F> CallbackJwtProvider<F>
where
    F: Fn(&TokenContext) -> Result<String> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> AccessTokenProvider for CallbackJwtProvider<F>
where
    F: Fn(&TokenContext) -> Result<String> + Send + Sync,
{
    fn get_token(&self, context: &TokenContext) -> Result<Jwt> {
        let token = (self.callback)(context)?;
        token.parse()
    }
}

/// Generates tokens locally with a [`JwtGenerator`].
pub struct GeneratorJwtProvider<C: CardCrypto> {
    generator: JwtGenerator<C>,
    default_identity: String,
    additional_data: Option<ExtraFields>,
}

impl<C: CardCrypto> GeneratorJwtProvider<C> {
    /// `default_identity` is used when the context carries no identity.
    pub fn new(generator: JwtGenerator<C>, default_identity: impl Into<String>) -> Self {
        Self {
            generator,
            default_identity: default_identity.into(),
            additional_data: None,
        }
    }

    pub fn additional_data(mut self, additional_data: ExtraFields) -> Self {
        self.additional_data = Some(additional_data);
        self
    }
}

impl<C> AccessTokenProvider for GeneratorJwtProvider<C>
where
    C: CardCrypto,
    C::PrivateKey: Send + Sync,
{
    fn get_token(&self, context: &TokenContext) -> Result<Jwt> {
        let identity = if context.identity.is_empty() {
            self.default_identity.as_str()
        } else {
            context.identity.as_str()
        };
        if identity.is_empty() {
            return Err(CardError::Configuration(
                "no identity available for token generation".into(),
            ));
        }
        self.generator
            .generate_token(identity, self.additional_data.clone())
    }
}
