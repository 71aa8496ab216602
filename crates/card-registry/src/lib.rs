//! Card registry: signed, content-addressed identity cards.
//!
//! A card binds an identity string to a public key. Cards are self-signed,
//! identified by a hash of their exact content bytes, published to a card
//! service, and rotated by issuing a new card that names its predecessor.
//! Search results are reassembled into one-hop rotation chains.

pub mod auth;
pub mod card;
pub mod client;
pub mod crypto;
pub mod error;
pub mod manager;
pub mod model;
pub mod signer;
pub mod time;
pub mod verification;

// Re-export primary types
pub use card::{derive_card_id, link_cards, parse_card, Card, CardParams, CardSignature};
pub use crypto::{CardCrypto, Ed25519Crypto, KeyPair};
pub use error::{CardError, Result};
pub use manager::{CardManager, CardManagerBuilder, SelfSignFailure};
pub use model::{CardContent, ExtraFields, ExtraValue, RawSignature, SignedModel, CARD_VERSION};
pub use signer::ModelSigner;

// Re-export collaborator interfaces
pub use auth::{AccessTokenProvider, Jwt, JwtGenerator, TokenContext};
pub use client::{CardClient, ClientResponse, ErrorResponse, HttpCardClient, InMemoryCardClient};
pub use verification::{CardVerifier, NullCardVerifier, SignatureCardVerifier};
