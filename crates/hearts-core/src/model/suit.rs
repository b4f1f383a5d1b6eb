use core::fmt;

/// Suit order doubles as the tie-break order for cards of equal rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Spades = 2,
    Hearts = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Spades, Suit::Hearts];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Clubs),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Spades),
            3 => Some(Suit::Hearts),
            _ => None,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'C' | '♣' => Some(Suit::Clubs),
            'D' | '♦' => Some(Suit::Diamonds),
            'S' | '♠' => Some(Suit::Spades),
            'H' | '♥' => Some(Suit::Hearts),
            _ => None,
        }
    }

    pub const fn is_heart(self) -> bool {
        matches!(self, Suit::Hearts)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Clubs => "C",
            Suit::Diamonds => "D",
            Suit::Spades => "S",
            Suit::Hearts => "H",
        };
        f.write_str(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::Suit;

    #[test]
    fn display_and_symbol_agree() {
        for suit in Suit::ALL {
            let text = suit.to_string();
            let symbol = text.chars().next().unwrap();
            assert_eq!(Suit::from_symbol(symbol), Some(suit));
        }
        assert_eq!(Suit::from_symbol('x'), None);
    }

    #[test]
    fn hearts_rank_last() {
        assert!(Suit::ALL.iter().all(|s| *s <= Suit::Hearts));
        assert_eq!(Suit::from_index(4), None);
    }
}
