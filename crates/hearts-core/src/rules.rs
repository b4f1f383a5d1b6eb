//! Legal-move evaluation shared by the live round and every simulated node.
//!
//! [`RoundState::play`](crate::model::round::RoundState::play) validates against
//! this module, so simulated play can never follow different rules from the
//! real table.

use crate::model::card::Card;
use crate::model::suit::Suit;

/// Cards `hand` may legally play into a trick whose cards so far are `trick`.
///
/// Non-empty whenever `hand` is non-empty. Output keeps the order of `hand`.
pub fn legal_moves(
    hand: &[Card],
    trick: &[Card],
    hearts_broken: bool,
    first_trick: bool,
) -> Vec<Card> {
    legal_moves_for_lead(hand, trick.first().map(|card| card.suit), hearts_broken, first_trick)
}

/// Same as [`legal_moves`], keyed by the led suit (`None` when leading).
pub fn legal_moves_for_lead(
    hand: &[Card],
    lead_suit: Option<Suit>,
    hearts_broken: bool,
    first_trick: bool,
) -> Vec<Card> {
    match lead_suit {
        None => leading_moves(hand, hearts_broken, first_trick),
        Some(suit) => following_moves(hand, suit, first_trick),
    }
}

pub fn is_legal(
    card: Card,
    hand: &[Card],
    trick: &[Card],
    hearts_broken: bool,
    first_trick: bool,
) -> bool {
    legal_moves(hand, trick, hearts_broken, first_trick).contains(&card)
}

fn leading_moves(hand: &[Card], hearts_broken: bool, first_trick: bool) -> Vec<Card> {
    if first_trick && hand.contains(&Card::TWO_OF_CLUBS) {
        return vec![Card::TWO_OF_CLUBS];
    }

    let only_hearts = hand.iter().all(|card| card.suit.is_heart());
    if hearts_broken || only_hearts {
        return hand.to_vec();
    }

    hand.iter()
        .copied()
        .filter(|card| !card.suit.is_heart())
        .collect()
}

fn following_moves(hand: &[Card], lead_suit: Suit, first_trick: bool) -> Vec<Card> {
    let matching: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|card| card.suit == lead_suit)
        .collect();
    if !matching.is_empty() {
        return matching;
    }

    if first_trick {
        let safe: Vec<Card> = hand
            .iter()
            .copied()
            .filter(|card| !card.is_penalty())
            .collect();
        // An all-point hand is forced to shed one of them.
        if !safe.is_empty() {
            return safe;
        }
    }

    hand.to_vec()
}
