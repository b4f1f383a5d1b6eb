use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::suit::Suit;
use thiserror::Error;

pub const TRICK_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trick {
    leader: PlayerPosition,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Play {
    pub position: PlayerPosition,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrickError {
    #[error("trick already complete")]
    TrickComplete,
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn {
        expected: PlayerPosition,
        actual: PlayerPosition,
    },
}

impl Trick {
    pub fn new(leader: PlayerPosition) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(TRICK_SIZE),
        }
    }

    /// Rebuilds an in-progress trick from plays given in order.
    pub fn from_plays(
        leader: PlayerPosition,
        plays: impl IntoIterator<Item = (PlayerPosition, Card)>,
    ) -> Result<Self, TrickError> {
        let mut trick = Trick::new(leader);
        for (position, card) in plays {
            trick.play(position, card)?;
        }
        Ok(trick)
    }

    pub fn leader(&self) -> PlayerPosition {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == TRICK_SIZE
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn has_played(&self, position: PlayerPosition) -> bool {
        self.plays.iter().any(|play| play.position == position)
    }

    pub fn expected_position(&self) -> PlayerPosition {
        self.plays
            .last()
            .map(|play| play.position.next())
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, position: PlayerPosition, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        let expected = self.expected_position();
        if expected != position {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: position,
            });
        }

        self.plays.push(Play { position, card });
        Ok(())
    }

    /// Highest card of the led suit played so far. Off-suit cards never qualify.
    pub fn winning_play(&self) -> Option<Play> {
        let lead_suit = self.lead_suit()?;
        self.plays
            .iter()
            .filter(|play| play.card.suit == lead_suit)
            .max_by_key(|play| play.card.rank)
            .copied()
    }

    pub fn winner(&self) -> Option<PlayerPosition> {
        if !self.is_complete() {
            return None;
        }
        self.winning_play().map(|play| play.position)
    }

    pub fn penalty_total(&self) -> u8 {
        self.plays
            .iter()
            .map(|play| play.card.penalty_value())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn plays_follow_turn_order() {
        let mut trick = Trick::new(PlayerPosition::North);
        assert!(
            trick
                .play(PlayerPosition::North, Card::new(Rank::Two, Suit::Clubs))
                .is_ok()
        );
        assert!(matches!(
            trick.play(PlayerPosition::South, Card::new(Rank::Three, Suit::Clubs)),
            Err(TrickError::OutOfTurn { .. })
        ));
        assert_eq!(trick.expected_position(), PlayerPosition::East);
    }

    #[test]
    fn off_suit_ace_never_wins() {
        let trick = Trick::from_plays(
            PlayerPosition::North,
            [
                (PlayerPosition::North, Card::new(Rank::Ten, Suit::Clubs)),
                (PlayerPosition::East, Card::new(Rank::Queen, Suit::Clubs)),
                (PlayerPosition::South, Card::new(Rank::Four, Suit::Clubs)),
                (PlayerPosition::West, Card::new(Rank::Ace, Suit::Spades)),
            ],
        )
        .unwrap();

        assert_eq!(trick.winner(), Some(PlayerPosition::East));
        assert_eq!(trick.penalty_total(), 0);
    }

    #[test]
    fn winning_play_tracks_partial_trick() {
        let trick = Trick::from_plays(
            PlayerPosition::West,
            [
                (PlayerPosition::West, Card::new(Rank::Five, Suit::Diamonds)),
                (PlayerPosition::North, Card::new(Rank::King, Suit::Hearts)),
            ],
        )
        .unwrap();
        assert_eq!(trick.winner(), None);
        let best = trick.winning_play().unwrap();
        assert_eq!(best.position, PlayerPosition::West);
        assert!(trick.has_played(PlayerPosition::North));
        assert!(!trick.has_played(PlayerPosition::East));
    }

    #[test]
    fn fifth_card_is_rejected() {
        let mut trick = Trick::new(PlayerPosition::North);
        for (seat, rank) in PlayerPosition::North
            .clockwise()
            .zip([Rank::Two, Rank::Three, Rank::Four, Rank::Five])
        {
            trick.play(seat, Card::new(rank, Suit::Clubs)).unwrap();
        }
        assert!(trick.is_complete());
        assert_eq!(
            trick.play(PlayerPosition::North, Card::new(Rank::Six, Suit::Clubs)),
            Err(TrickError::TrickComplete)
        );
        assert_eq!(trick.penalty_total(), 0);
    }
}
