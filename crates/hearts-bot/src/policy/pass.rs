use super::PassStrategy;
use hearts_core::model::card::Card;
use hearts_core::model::hand::Hand;
use hearts_core::model::passing::PassingDirection;
use hearts_core::model::rank::Rank;
use hearts_core::model::suit::Suit;
use tracing::{Level, event};

const MAX_PLAIN_SPADES: usize = 2;

/// Score-and-rank pass heuristic: shed the queen, high spades, high hearts
/// and short high side suits while keeping low escape cards.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPassHeuristic;

impl StaticPassHeuristic {
    /// Danger of keeping `card`; higher means pass it sooner.
    pub fn danger(card: Card, hand: &Hand) -> i32 {
        let rank = i32::from(card.rank.value());
        let suit_count = hand.suit_count(card.suit);
        let mut score = 0;

        if card.is_queen_of_spades() {
            score += if hand.suit_count(Suit::Spades) >= 4 { 75 } else { 300 };
        }

        if card.suit == Suit::Spades {
            score += match card.rank {
                Rank::Ace => 150,
                Rank::King => 120,
                Rank::Queen => 0,
                _ => 10,
            };
        }

        if card.suit.is_heart() {
            score += rank * 8;
        }

        if matches!(card.suit, Suit::Clubs | Suit::Diamonds) && card.rank >= Rank::Jack {
            score += 40 + (rank - 10) * 10;
            if suit_count <= 2 {
                score += 60;
            }
        }

        if suit_count == 1 {
            score += if card.suit == Suit::Spades { 30 } else { 80 };
        }

        if card.rank <= Rank::Five {
            score -= 40;
        }

        score + rank
    }

    /// Hand ordered from most to least dangerous; ties keep hand order.
    pub fn ranked(hand: &Hand) -> Vec<(Card, i32)> {
        let mut scored: Vec<(Card, i32)> = hand
            .iter()
            .map(|&card| (card, Self::danger(card, hand)))
            .collect();
        scored.sort_by(|(_, a), (_, b)| b.cmp(a));
        scored
    }
}

impl PassStrategy for StaticPassHeuristic {
    fn choose_pass(&self, hand: &Hand, direction: PassingDirection) -> Option<[Card; 3]> {
        if hand.len() < 3 {
            return None;
        }

        let ordered = Self::ranked(hand);
        let mut picks: Vec<Card> = Vec::with_capacity(3);
        let mut plain_spades = 0;
        for &(card, _) in &ordered {
            if picks.len() == 3 {
                break;
            }
            if card.suit == Suit::Spades && !card.is_queen_of_spades() {
                if plain_spades >= MAX_PLAIN_SPADES {
                    continue;
                }
                plain_spades += 1;
            }
            picks.push(card);
        }
        for &(card, _) in &ordered {
            if picks.len() == 3 {
                break;
            }
            if !picks.contains(&card) {
                picks.push(card);
            }
        }

        let selection = [picks[0], picks[1], picks[2]];
        event!(
            target: "hearts_bot::pass",
            Level::DEBUG,
            direction = direction.as_str(),
            hand_size = hand.len(),
            cards = ?selection,
        );
        Some(selection)
    }
}
