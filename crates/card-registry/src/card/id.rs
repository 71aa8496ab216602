//! Card identifiers: content-addressed from the snapshot bytes.
//!
//! Format: lowercase hex of the first 32 bytes of hash(content_snapshot).

use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};

/// Number of digest bytes kept for an identifier.
pub const CARD_ID_BYTES: usize = 32;

/// Derive a card identifier from its exact content snapshot bytes.
pub fn derive_card_id<C: CardCrypto>(crypto: &C, content_snapshot: &[u8]) -> Result<String> {
    let digest = crypto.hash(content_snapshot)?;
    if digest.len() < CARD_ID_BYTES {
        return Err(CardError::Crypto(format!(
            "digest too short for card id: {} bytes",
            digest.len()
        )));
    }
    Ok(hex::encode(&digest[..CARD_ID_BYTES]))
}

/// Check that `id` has the shape of a card identifier.
pub fn is_valid_card_id(id: &str) -> bool {
    id.len() == CARD_ID_BYTES * 2
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
