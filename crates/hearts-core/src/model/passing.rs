use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassingDirection {
    Left,
    Right,
    Across,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PassingError {
    #[error("{seat} tried to pass {card}, which it does not hold")]
    CardNotInHand { seat: PlayerPosition, card: Card },
    #[error("{seat} selected {card} more than once")]
    DuplicateSelection { seat: PlayerPosition, card: Card },
}

impl PassingDirection {
    pub const CYCLE: [PassingDirection; 4] = [
        PassingDirection::Left,
        PassingDirection::Right,
        PassingDirection::Across,
        PassingDirection::Hold,
    ];

    /// Direction used in the given zero-based round.
    pub const fn for_round(round_index: usize) -> PassingDirection {
        Self::CYCLE[round_index % Self::CYCLE.len()]
    }

    pub const fn requires_selection(self) -> bool {
        !matches!(self, PassingDirection::Hold)
    }

    pub const fn target(self, seat: PlayerPosition) -> PlayerPosition {
        match self {
            PassingDirection::Left => seat.next(),
            PassingDirection::Right => seat.previous(),
            PassingDirection::Across => seat.opposite(),
            PassingDirection::Hold => seat,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PassingDirection::Left => "left",
            PassingDirection::Right => "right",
            PassingDirection::Across => "across",
            PassingDirection::Hold => "hold",
        }
    }
}

/// Moves every seat's three selected cards to its target at once.
///
/// Selections are all validated before any hand is touched, so a failed
/// exchange leaves `hands` unchanged.
pub fn exchange(
    hands: &mut [Hand; 4],
    selections: &[[Card; 3]; 4],
    direction: PassingDirection,
) -> Result<(), PassingError> {
    if !direction.requires_selection() {
        return Ok(());
    }

    for seat in PlayerPosition::LOOP {
        let picks = &selections[seat.index()];
        for (idx, card) in picks.iter().enumerate() {
            if !hands[seat.index()].contains(*card) {
                return Err(PassingError::CardNotInHand { seat, card: *card });
            }
            if picks[..idx].contains(card) {
                return Err(PassingError::DuplicateSelection { seat, card: *card });
            }
        }
    }

    for seat in PlayerPosition::LOOP {
        for card in selections[seat.index()] {
            hands[seat.index()].remove(card);
        }
    }
    for seat in PlayerPosition::LOOP {
        let target = direction.target(seat);
        for card in selections[seat.index()] {
            hands[target.index()].add(card);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{PassingDirection, PassingError, exchange};
    use crate::model::card::Card;
    use crate::model::hand::Hand;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use std::array;

    fn suited_hands() -> [Hand; 4] {
        array::from_fn(|idx| {
            let suit = Suit::from_index(idx).unwrap();
            Rank::ORDERED.iter().map(|&rank| Card::new(rank, suit)).collect()
        })
    }

    fn lowest_three(hands: &[Hand; 4]) -> [[Card; 3]; 4] {
        array::from_fn(|idx| {
            let cards = hands[idx].cards();
            [cards[0], cards[1], cards[2]]
        })
    }

    #[test]
    fn direction_cycle_repeats_every_four_rounds() {
        assert_eq!(PassingDirection::for_round(0), PassingDirection::Left);
        assert_eq!(PassingDirection::for_round(3), PassingDirection::Hold);
        assert_eq!(PassingDirection::for_round(5), PassingDirection::Right);
    }

    #[test]
    fn target_mapping_works() {
        let north = PlayerPosition::North;
        assert_eq!(PassingDirection::Left.target(north), PlayerPosition::East);
        assert_eq!(PassingDirection::Right.target(north), PlayerPosition::West);
        assert_eq!(PassingDirection::Across.target(north), PlayerPosition::South);
        assert_eq!(PassingDirection::Hold.target(north), north);
    }

    #[test]
    fn exchange_moves_cards_to_target() {
        let mut hands = suited_hands();
        let picks = lowest_three(&hands);
        exchange(&mut hands, &picks, PassingDirection::Left).unwrap();

        for seat in PlayerPosition::LOOP {
            assert_eq!(hands[seat.index()].len(), 13);
        }
        let east = &hands[PlayerPosition::East.index()];
        assert!(east.contains(Card::TWO_OF_CLUBS));
        assert!(!hands[PlayerPosition::North.index()].contains(Card::TWO_OF_CLUBS));
    }

    #[test]
    fn invalid_selection_leaves_hands_unchanged() {
        let mut hands = suited_hands();
        let before = hands.clone();
        let mut picks = lowest_three(&hands);
        picks[2][1] = Card::TWO_OF_CLUBS;
        let err = exchange(&mut hands, &picks, PassingDirection::Across).unwrap_err();
        assert_eq!(
            err,
            PassingError::CardNotInHand {
                seat: PlayerPosition::South,
                card: Card::TWO_OF_CLUBS
            }
        );
        assert_eq!(hands, before);
    }

    #[test]
    fn hold_is_a_no_op() {
        let mut hands = suited_hands();
        let before = hands.clone();
        let picks = lowest_three(&hands);
        exchange(&mut hands, &picks, PassingDirection::Hold).unwrap();
        assert_eq!(hands, before);
    }
}
