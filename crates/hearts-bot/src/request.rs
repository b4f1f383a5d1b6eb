use hearts_core::model::card::Card;
use hearts_core::model::deck::DECK_SIZE;
use hearts_core::model::player::PlayerPosition;
use hearts_core::model::round::{RoundError, RoundState};
use hearts_core::model::trick::{TRICK_SIZE, TrickError};
use std::array;
use thiserror::Error;

/// Everything the acting seat may know when asked for a card.
///
/// `hand_sizes` is what the caller believes each seat still holds; it only
/// sizes the sampled opposing hands and is checked against the public record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    pub seat: PlayerPosition,
    pub hand: Vec<Card>,
    pub hand_sizes: [usize; 4],
    pub trick: Vec<(PlayerPosition, Card)>,
    pub hearts_broken: bool,
    pub played: Vec<Card>,
    pub won: [Vec<Card>; 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{0} appears more than once in the request")]
    DuplicateCard(Card),
    #[error("trick already holds {0} cards")]
    TrickFull(usize),
    #[error("trick expected {expected} to play but found {actual}")]
    TrickOutOfTurn {
        expected: PlayerPosition,
        actual: PlayerPosition,
    },
    #[error("{seat} is reported with {reported} cards but must hold {expected}")]
    HandSizeMismatch {
        seat: PlayerPosition,
        reported: usize,
        expected: usize,
    },
    #[error("request accounts for {0} cards instead of 52")]
    CardCountMismatch(usize),
    #[error("won piles hold {won} cards but {played} have been played")]
    WonPileMismatch { won: usize, played: usize },
    #[error("{0} sits in a won pile but was never played")]
    UnplayedWonCard(Card),
    #[error(transparent)]
    Trick(#[from] TrickError),
    #[error(transparent)]
    Round(#[from] RoundError),
}

impl DecisionRequest {
    /// Public view of `round` from `seat`: its own hand plus counts for the others.
    pub fn from_round(round: &RoundState, seat: PlayerPosition) -> Self {
        Self {
            seat,
            hand: round.hand(seat).cards().to_vec(),
            hand_sizes: array::from_fn(|idx| round.hands()[idx].len()),
            trick: round
                .current_trick()
                .plays()
                .iter()
                .map(|play| (play.position, play.card))
                .collect(),
            hearts_broken: round.hearts_broken(),
            played: round.played().to_vec(),
            won: array::from_fn(|idx| round.won(PlayerPosition::LOOP[idx]).to_vec()),
        }
    }

    pub fn is_first_trick(&self) -> bool {
        self.played.is_empty()
    }

    pub fn trick_cards(&self) -> Vec<Card> {
        self.trick.iter().map(|(_, card)| *card).collect()
    }

    /// Seat that led the open trick, or the acting seat when it is leading.
    pub fn leader(&self) -> PlayerPosition {
        self.trick.first().map(|(seat, _)| *seat).unwrap_or(self.seat)
    }

    /// Cards `seat` must hold given the acting hand and the open trick.
    pub fn expected_hand_size(&self, seat: PlayerPosition) -> usize {
        let played_into_trick = self.trick.iter().any(|(played_by, _)| *played_by == seat);
        if seat != self.seat && played_into_trick {
            self.hand.len().saturating_sub(1)
        } else {
            self.hand.len()
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.trick.len() >= TRICK_SIZE {
            return Err(RequestError::TrickFull(self.trick.len()));
        }

        let mut expected = self.leader();
        for (seat, _) in &self.trick {
            if *seat != expected {
                return Err(RequestError::TrickOutOfTurn {
                    expected,
                    actual: *seat,
                });
            }
            expected = expected.next();
        }
        if expected != self.seat {
            return Err(RequestError::TrickOutOfTurn {
                expected,
                actual: self.seat,
            });
        }

        let mut seen = 0u64;
        let known = self
            .hand
            .iter()
            .copied()
            .chain(self.trick.iter().map(|(_, card)| *card))
            .chain(self.played.iter().copied());
        for card in known {
            let bit = 1u64 << card.id();
            if seen & bit != 0 {
                return Err(RequestError::DuplicateCard(card));
            }
            seen |= bit;
        }

        for seat in PlayerPosition::LOOP {
            let expected = self.expected_hand_size(seat);
            let reported = self.hand_sizes[seat.index()];
            if reported != expected {
                return Err(RequestError::HandSizeMismatch {
                    seat,
                    reported,
                    expected,
                });
            }
        }

        let accounted = self.hand_sizes.iter().sum::<usize>() + self.trick.len() + self.played.len();
        if accounted != DECK_SIZE {
            return Err(RequestError::CardCountMismatch(accounted));
        }

        let won_total: usize = self.won.iter().map(Vec::len).sum();
        if won_total != 0 && won_total != self.played.len() {
            return Err(RequestError::WonPileMismatch {
                won: won_total,
                played: self.played.len(),
            });
        }
        if let Some(card) = self
            .won
            .iter()
            .flatten()
            .find(|card| !self.played.contains(card))
        {
            return Err(RequestError::UnplayedWonCard(*card));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DecisionRequest, RequestError};
    use hearts_core::model::card::Card;
    use hearts_core::model::deck::Deck;
    use hearts_core::model::player::PlayerPosition;
    use hearts_core::model::round::RoundState;

    fn opened_round() -> RoundState {
        let mut round = RoundState::deal(&Deck::shuffled_with_seed(7));
        for _ in 0..6 {
            let card = round.legal_moves()[0];
            round = round.play(card).unwrap();
        }
        round
    }

    #[test]
    fn request_from_live_round_is_valid() {
        let round = opened_round();
        let request = DecisionRequest::from_round(&round, round.to_act());
        assert_eq!(request.trick.len(), 2);
        assert_eq!(request.played.len(), 4);
        assert_eq!(request.validate(), Ok(()));
        assert!(!request.is_first_trick());
    }

    #[test]
    fn opponents_in_trick_hold_one_card_less() {
        let round = opened_round();
        let seat = round.to_act();
        let request = DecisionRequest::from_round(&round, seat);
        assert_eq!(request.expected_hand_size(seat), 12);
        assert_eq!(request.expected_hand_size(seat.previous()), 11);
        assert_eq!(request.expected_hand_size(seat.next()), 12);
    }

    #[test]
    fn duplicate_cards_are_rejected() {
        let round = opened_round();
        let mut request = DecisionRequest::from_round(&round, round.to_act());
        let first = request.hand[0];
        request.played[0] = first;
        assert_eq!(request.validate(), Err(RequestError::DuplicateCard(first)));
    }

    #[test]
    fn wrong_hand_sizes_are_rejected() {
        let round = opened_round();
        let seat = round.to_act();
        let mut request = DecisionRequest::from_round(&round, seat);
        request.hand_sizes[seat.next().index()] = 13;
        assert!(matches!(
            request.validate(),
            Err(RequestError::HandSizeMismatch { reported: 13, expected: 12, .. })
        ));
    }

    #[test]
    fn acting_out_of_turn_is_rejected() {
        let round = opened_round();
        let seat = round.to_act();
        let mut request = DecisionRequest::from_round(&round, seat);
        request.seat = seat.next();
        assert!(matches!(
            request.validate(),
            Err(RequestError::TrickOutOfTurn { .. })
        ));
    }

    #[test]
    fn missing_cards_are_detected() {
        let round = RoundState::deal(&Deck::standard());
        let seat = round.to_act();
        let mut request = DecisionRequest::from_round(&round, seat);
        let dropped = request.hand.pop().unwrap();
        assert_ne!(dropped, Card::TWO_OF_CLUBS);
        request.hand_sizes = [12; 4];
        assert_eq!(request.validate(), Err(RequestError::CardCountMismatch(48)));
    }
}
