use core::fmt;

/// Ordinal 2..=14; ranks compare within a suit only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ORDERED: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        if value < 2 || value > 14 {
            return None;
        }
        Some(Self::ORDERED[(value - 2) as usize])
    }

    pub fn from_symbol(text: &str) -> Option<Self> {
        match text.to_ascii_uppercase().as_str() {
            "J" => Some(Rank::Jack),
            "Q" => Some(Rank::Queen),
            "K" => Some(Rank::King),
            "A" => Some(Rank::Ace),
            "T" => Some(Rank::Ten),
            digits => digits.parse::<u8>().ok().and_then(Self::from_value),
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Jack => f.write_str("J"),
            Rank::Queen => f.write_str("Q"),
            Rank::King => f.write_str("K"),
            Rank::Ace => f.write_str("A"),
            numeric => write!(f, "{}", numeric.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_value(14), Some(Rank::Ace));
        assert_eq!(Rank::from_value(1), None);
        assert_eq!(Rank::from_value(15), None);
    }

    #[test]
    fn symbols_roundtrip_through_display() {
        for rank in Rank::ORDERED {
            assert_eq!(Rank::from_symbol(&rank.to_string()), Some(rank));
        }
        assert_eq!(Rank::from_symbol("t"), Some(Rank::Ten));
        assert_eq!(Rank::from_symbol("1"), None);
    }
}
