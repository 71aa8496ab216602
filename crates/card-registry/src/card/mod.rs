//! Cards and their identifiers, rotation linking and issuance params.

#[allow(clippy::module_inception)]
pub mod card;
pub mod chain;
pub mod id;
pub mod params;

pub use card::{parse_card, Card, CardSignature};
pub use chain::link_cards;
pub use id::{derive_card_id, is_valid_card_id};
pub use params::CardParams;
