//! Wire and content models of a card.

pub mod content;
pub mod extra;
pub mod signed;

pub use content::{CardContent, CARD_VERSION};
pub use extra::{canonical_json, ExtraFields, ExtraValue};
pub use signed::{RawSignature, SignedModel};
