//! Card content: the parsed shape of a content snapshot.
//!
//! The snapshot bytes produced by [`CardContent::encode`] are the bytes that
//! get hashed and signed. A decoded snapshot is never re-encoded for hashing;
//! callers keep the original bytes next to the parsed value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};

/// Card protocol version written into new content snapshots.
pub const CARD_VERSION: &str = "5.0";

/// Parsed content snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub identity: String,
    /// Base64 of the exported public key.
    pub public_key: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_card_id: Option<String>,
}

impl CardContent {
    /// Build the canonical content snapshot bytes.
    pub fn encode(
        identity: &str,
        public_key: &[u8],
        version: &str,
        created_at: u64,
        previous_card_id: Option<&str>,
    ) -> Result<Vec<u8>> {
        let content = CardContent {
            identity: identity.to_string(),
            public_key: STANDARD.encode(public_key),
            version: version.to_string(),
            created_at: Some(created_at),
            previous_card_id: previous_card_id.map(str::to_string),
        };
        Ok(serde_json::to_vec(&content)?)
    }

    /// Parse a content snapshot.
    pub fn decode(snapshot: &[u8]) -> Result<Self> {
        serde_json::from_slice(snapshot)
            .map_err(|e| CardError::Format(format!("invalid content snapshot: {e}")))
    }

    /// Decode the base64 public key field.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.public_key)
            .map_err(|e| CardError::Format(format!("invalid base64 public key: {e}")))
    }
}
