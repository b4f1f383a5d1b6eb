use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const TWO_OF_CLUBS: Card = Card::new(Rank::Two, Suit::Clubs);
    pub const QUEEN_OF_SPADES: Card = Card::new(Rank::Queen, Suit::Spades);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_penalty(self) -> bool {
        matches!(self.suit, Suit::Hearts) || self.is_queen_of_spades()
    }

    pub const fn is_queen_of_spades(self) -> bool {
        matches!(self.rank, Rank::Queen) && matches!(self.suit, Suit::Spades)
    }

    pub const fn is_two_of_clubs(self) -> bool {
        matches!(self.rank, Rank::Two) && matches!(self.suit, Suit::Clubs)
    }

    pub const fn penalty_value(self) -> u8 {
        if self.is_queen_of_spades() {
            13
        } else if self.suit.is_heart() {
            1
        } else {
            0
        }
    }

    /// Dense index in `0..52`, suit-major.
    pub const fn id(self) -> u8 {
        (self.suit as u8) * 13 + (self.rank.value() - 2)
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if id >= 52 {
            return None;
        }
        let suit = match Suit::from_index((id / 13) as usize) {
            Some(suit) => suit,
            None => return None,
        };
        match Rank::from_value(id % 13 + 2) {
            Some(rank) => Some(Card::new(rank, suit)),
            None => None,
        }
    }
}

// Suit-major so sorted hands and tie-breaks read the same everywhere.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.suit
            .cmp(&other.suit)
            .then_with(|| self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised card '{0}' (expected rank then suit, e.g. QS or 10H)")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let mut chars = trimmed.chars();
        let suit = chars
            .next_back()
            .and_then(Suit::from_symbol)
            .ok_or_else(|| ParseCardError(text.to_string()))?;
        let rank = Rank::from_symbol(chars.as_str()).ok_or_else(|| ParseCardError(text.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

/// Parses a whitespace separated card list such as `"2C QS 10H"`.
pub fn parse_cards(text: &str) -> Result<Vec<Card>, ParseCardError> {
    text.split_whitespace().map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit, parse_cards};

    #[test]
    fn queen_of_spades_identified() {
        let card = Card::new(Rank::Queen, Suit::Spades);
        assert!(card.is_queen_of_spades());
        assert!(card.is_penalty());
        assert_eq!(card.penalty_value(), 13);
        assert_eq!(card, Card::QUEEN_OF_SPADES);
    }

    #[test]
    fn regular_card_not_penalty() {
        let card = Card::new(Rank::Ten, Suit::Clubs);
        assert!(!card.is_penalty());
        assert_eq!(card.penalty_value(), 0);
    }

    #[test]
    fn hearts_are_one_point() {
        let card = Card::new(Rank::Ace, Suit::Hearts);
        assert!(card.is_penalty());
        assert_eq!(card.penalty_value(), 1);
    }

    #[test]
    fn ids_cover_the_deck_once() {
        let mut seen = [false; 52];
        for id in 0..52u8 {
            let card = Card::from_id(id).expect("valid id");
            assert_eq!(card.id(), id);
            assert!(!seen[id as usize]);
            seen[id as usize] = true;
        }
        assert_eq!(Card::from_id(52), None);
    }

    #[test]
    fn ordering_is_suit_then_rank() {
        let low_spade = Card::new(Rank::Two, Suit::Spades);
        let high_diamond = Card::new(Rank::Ace, Suit::Diamonds);
        assert!(high_diamond < low_spade);
        assert!(Card::new(Rank::Three, Suit::Clubs) > Card::TWO_OF_CLUBS);
    }

    #[test]
    fn parses_display_form() {
        let card: Card = "10H".parse().unwrap();
        assert_eq!(card, Card::new(Rank::Ten, Suit::Hearts));
        assert_eq!("qs".parse::<Card>().unwrap(), Card::QUEEN_OF_SPADES);
        assert!("ZZ".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
        let cards = parse_cards("2C AD").unwrap();
        assert_eq!(cards, vec![Card::TWO_OF_CLUBS, Card::new(Rank::Ace, Suit::Diamonds)]);
    }
}
