//! SignedModel: the transport/storage envelope of a card.
//!
//! Wire format (JSON):
//! ```json
//! {
//!     "content_snapshot": "<base64 content snapshot>",
//!     "signatures": [
//!         { "signer": "self", "signature": "<base64>", "snapshot": "<base64, optional>" }
//!     ]
//! }
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One signature entry of a [`SignedModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignature {
    pub signer: String,
    #[serde(with = "b64")]
    pub signature: Vec<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "b64_opt"
    )]
    pub snapshot: Option<Vec<u8>>,
}

impl RawSignature {
    pub fn new(signer: impl Into<String>, signature: Vec<u8>, snapshot: Option<Vec<u8>>) -> Self {
        Self {
            signer: signer.into(),
            signature,
            snapshot,
        }
    }
}

/// Content snapshot plus its ordered signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedModel {
    #[serde(with = "b64")]
    content_snapshot: Vec<u8>,
    #[serde(default)]
    signatures: Vec<RawSignature>,
}

impl SignedModel {
    /// Create a model from a content snapshot and its signatures.
    pub fn new(content_snapshot: Vec<u8>, signatures: Vec<RawSignature>) -> Self {
        Self {
            content_snapshot,
            signatures,
        }
    }

    pub fn content_snapshot(&self) -> &[u8] {
        &self.content_snapshot
    }

    pub fn signatures(&self) -> &[RawSignature] {
        &self.signatures
    }

    /// Return a new model with `signature` appended.
    pub fn with_signature(&self, signature: RawSignature) -> Self {
        let mut signatures = self.signatures.clone();
        signatures.push(signature);
        Self {
            content_snapshot: self.content_snapshot.clone(),
            signatures,
        }
    }

    /// Export as JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Export as base64 of the JSON envelope.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_json()?))
    }

    /// Parse from base64 of the JSON envelope.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let json = STANDARD.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }
}

mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map_err(|e| serde::de::Error::custom(format!("invalid base64: {e}")))
    }
}

mod b64_opt {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let Some(encoded) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid base64: {e}")))
    }
}
