//! Rotation chain linking.
//!
//! A directory search returns every card for an identity, unordered and
//! unlinked. Linking attaches to each card the card it replaced
//! (`previous_card_id`), exactly one hop deep, and drops the replaced card
//! from the top level.

use super::card::Card;

/// Link a batch of cards sharing one identity.
///
/// Cards that replace another card in the batch come first, in input order,
/// each carrying an outdated copy of its predecessor. Every remaining card
/// follows in input order, unmodified, and a repeated id is emitted once.
/// Cards with an empty id are never linked in either direction and always
/// come out standalone.
pub fn link_cards<K: Clone>(cards: Vec<Card<K>>) -> Vec<Card<K>> {
    let mut linked: Vec<Card<K>> = Vec::with_capacity(cards.len());

    for (index, card) in cards.iter().enumerate() {
        if card.id.is_empty() || linked.iter().any(|l| l.id == card.id) {
            continue;
        }
        let Some(previous_id) = card
            .previous_card_id
            .as_deref()
            .filter(|id| !id.is_empty())
        else {
            continue;
        };

        // Ids are content-addressed, so at most one candidate is expected;
        // the first one wins otherwise.
        let previous = cards
            .iter()
            .enumerate()
            .find(|(other, c)| *other != index && !c.id.is_empty() && c.id == previous_id);

        if let Some((_, previous)) = previous {
            linked.push(card.clone().with_previous(previous));
        }
    }

    for card in cards {
        let represented = !card.id.is_empty()
            && linked.iter().any(|l| {
                l.id == card.id
                    || l
                        .previous_card
                        .as_ref()
                        .is_some_and(|previous| previous.id == card.id)
            });

        if !represented {
            linked.push(card);
        }
    }

    linked
}
