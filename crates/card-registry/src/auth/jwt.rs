//! JWT access tokens for the card service.
//!
//! Token string: `b64url(header).b64url(body).b64url(signature)`, unpadded.
//! The signature covers the ASCII bytes of `b64url(header).b64url(body)`.
//!
//! Body claims:
//! - `iss`: `virgil-<app_id>`
//! - `sub`: `identity-<identity>`
//! - `iat` / `exp`: unix seconds
//! - `ada`: optional additional data

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::model::ExtraFields;

pub const JWT_ALGORITHM: &str = "VEDS512";
pub const JWT_TYPE: &str = "JWT";
pub const JWT_CONTENT_TYPE: &str = "virgil-jwt;v=1";

const ISSUER_PREFIX: &str = "virgil-";
const SUBJECT_PREFIX: &str = "identity-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    /// Identifier of the API key that signed the token.
    pub kid: String,
    pub typ: String,
    pub cty: String,
}

impl JwtHeader {
    pub fn new(api_key_id: impl Into<String>) -> Self {
        Self {
            alg: JWT_ALGORITHM.to_string(),
            kid: api_key_id.into(),
            typ: JWT_TYPE.to_string(),
            cty: JWT_CONTENT_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtBody {
    pub iss: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ada: Option<ExtraFields>,
}

impl JwtBody {
    pub fn new(
        app_id: &str,
        identity: &str,
        issued_at: u64,
        expires_at: u64,
        additional_data: Option<ExtraFields>,
    ) -> Self {
        Self {
            iss: format!("{ISSUER_PREFIX}{app_id}"),
            sub: format!("{SUBJECT_PREFIX}{identity}"),
            iat: issued_at,
            exp: expires_at,
            ada: additional_data,
        }
    }

    pub fn identity(&self) -> &str {
        self.sub.strip_prefix(SUBJECT_PREFIX).unwrap_or(&self.sub)
    }

    pub fn app_id(&self) -> &str {
        self.iss.strip_prefix(ISSUER_PREFIX).unwrap_or(&self.iss)
    }
}

/// A signed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jwt {
    header: JwtHeader,
    body: JwtBody,
    unsigned: String,
    signature: Vec<u8>,
}

impl Jwt {
    fn encode_unsigned(header: &JwtHeader, body: &JwtBody) -> Result<String> {
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(body)?)
        ))
    }

    /// Bytes a token signer signs for `header` and `body`.
    pub fn signing_input(header: &JwtHeader, body: &JwtBody) -> Result<Vec<u8>> {
        Ok(Self::encode_unsigned(header, body)?.into_bytes())
    }

    pub fn new(header: JwtHeader, body: JwtBody, signature: Vec<u8>) -> Result<Self> {
        let unsigned = Self::encode_unsigned(&header, &body)?;
        Ok(Self {
            header,
            body,
            unsigned,
            signature,
        })
    }

    pub fn header(&self) -> &JwtHeader {
        &self.header
    }

    pub fn body(&self) -> &JwtBody {
        &self.body
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Identity the token was issued for.
    pub fn identity(&self) -> &str {
        self.body.identity()
    }

    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.body.exp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(crate::time::now_secs())
    }

    /// Check the token signature against the API public key.
    pub fn verify_signature<C: CardCrypto>(
        &self,
        crypto: &C,
        api_public_key: &C::PublicKey,
    ) -> Result<bool> {
        crypto.verify(self.unsigned.as_bytes(), &self.signature, api_public_key)
    }
}

impl fmt::Display for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.unsigned, URL_SAFE_NO_PAD.encode(&self.signature))
    }
}

impl FromStr for Jwt {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let &[header_b64, body_b64, signature_b64] = parts.as_slice() else {
            return Err(CardError::Token("JWT must have three parts".into()));
        };

        let decode = |part: &str| {
            URL_SAFE_NO_PAD
                .decode(part)
                .map_err(|e| CardError::Token(format!("invalid JWT encoding: {e}")))
        };
        let header: JwtHeader = serde_json::from_slice(&decode(header_b64)?)
            .map_err(|e| CardError::Token(format!("invalid JWT header: {e}")))?;
        let body: JwtBody = serde_json::from_slice(&decode(body_b64)?)
            .map_err(|e| CardError::Token(format!("invalid JWT body: {e}")))?;

        Ok(Self {
            header,
            body,
            unsigned: format!("{header_b64}.{body_b64}"),
            signature: decode(signature_b64)?,
        })
    }
}

/// Issues tokens signed with an application API key.
pub struct JwtGenerator<C: CardCrypto> {
    crypto: C,
    api_key: C::PrivateKey,
    api_key_id: String,
    app_id: String,
    ttl_secs: u64,
}

impl<C: CardCrypto> JwtGenerator<C> {
    pub fn new(
        crypto: C,
        api_key: C::PrivateKey,
        api_key_id: impl Into<String>,
        app_id: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            crypto,
            api_key,
            api_key_id: api_key_id.into(),
            app_id: app_id.into(),
            ttl_secs,
        }
    }

    /// Issue a token for `identity` valid from now for the configured TTL.
    pub fn generate_token(
        &self,
        identity: &str,
        additional_data: Option<ExtraFields>,
    ) -> Result<Jwt> {
        self.generate_token_at(identity, additional_data, crate::time::now_secs())
    }

    pub fn generate_token_at(
        &self,
        identity: &str,
        additional_data: Option<ExtraFields>,
        issued_at: u64,
    ) -> Result<Jwt> {
        let header = JwtHeader::new(self.api_key_id.clone());
        let body = JwtBody::new(
            &self.app_id,
            identity,
            issued_at,
            issued_at.saturating_add(self.ttl_secs),
            additional_data,
        );
        let signature = self
            .crypto
            .sign(&Jwt::signing_input(&header, &body)?, &self.api_key)?;
        Jwt::new(header, body, signature)
    }
}
