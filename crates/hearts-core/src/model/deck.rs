use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::array;

pub const DECK_SIZE: usize = 52;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ORDERED.iter().map(move |&rank| Card::new(rank, suit)))
            .collect();
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Round-robin deal starting with North.
    pub fn deal_hands(&self) -> [Hand; 4] {
        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        for (index, card) in self.cards.iter().enumerate() {
            hands[index % 4].add(*card);
        }
        hands
    }
}
