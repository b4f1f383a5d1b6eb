use crate::model::card::Card;
use crate::model::suit::Suit;
use std::vec::Vec;

/// Cards held by one seat, kept sorted by suit then rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.cards.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        let index = self.cards.partition_point(|held| *held < card);
        self.cards.insert(index, card);
    }

    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.binary_search(&card) {
            Ok(index) => {
                self.cards.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.binary_search(&card).is_ok()
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|card| card.suit == suit)
    }

    pub fn suit_count(&self, suit: Suit) -> usize {
        self.cards.iter().filter(|card| card.suit == suit).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn penalty_total(&self) -> u32 {
        self.cards.iter().map(|card| u32::from(card.penalty_value())).sum()
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Hand::with_cards(iter.into_iter().collect())
    }
}
