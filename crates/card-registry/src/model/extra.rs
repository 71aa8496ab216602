//! Extra fields: typed key/value data signed alongside a card.
//!
//! Keys are kept sorted so the canonical JSON form is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordered, string-keyed mapping of extra signed fields.
pub type ExtraFields = BTreeMap<String, ExtraValue>;

/// A single extra-field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Map(BTreeMap<String, ExtraValue>),
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ExtraValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<ExtraFields> for ExtraValue {
    fn from(value: ExtraFields) -> Self {
        Self::Map(value)
    }
}

/// Canonical byte form of extra fields, as signed and stored in a
/// signature snapshot.
pub fn canonical_json(fields: &ExtraFields) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(fields)?)
}

/// Parse a signature snapshot back into extra fields.
pub fn parse_extra_fields(snapshot: &[u8]) -> Result<ExtraFields> {
    Ok(serde_json::from_slice(snapshot)?)
}
