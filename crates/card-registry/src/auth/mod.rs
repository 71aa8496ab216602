//! Access tokens: JWTs scoped to an identity and operation.

pub mod jwt;
pub mod provider;

pub use jwt::{Jwt, JwtBody, JwtGenerator, JwtHeader};
pub use provider::{
    AccessTokenProvider, CallbackJwtProvider, ConstAccessTokenProvider, GeneratorJwtProvider,
    TokenContext,
};
