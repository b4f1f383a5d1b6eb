use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use crate::rules;
use std::array;
use thiserror::Error;

/// One round of play: four hands, the trick in progress, resolved history and
/// each seat's won pile.
///
/// Transitions come in two flavours. [`RoundState::play`] leaves `self`
/// untouched and returns the successor, which is what search nodes store.
/// [`RoundState::apply`] mutates in place and is meant for states nobody else
/// can observe, such as a rollout's private copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    hands: [Hand; 4],
    current_trick: Trick,
    hearts_broken: bool,
    played: Vec<Card>,
    won: [Vec<Card>; 4],
}

/// Raw pieces used to rebuild a mid-round state (determinization, fixtures).
#[derive(Debug, Clone)]
pub struct RoundParts {
    pub hands: [Hand; 4],
    pub current_trick: Trick,
    pub hearts_broken: bool,
    pub played: Vec<Card>,
    pub won: [Vec<Card>; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: PlayerPosition, penalties: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("round is over")]
    RoundOver,
    #[error("{seat} does not hold {card}")]
    CardNotInHand { seat: PlayerPosition, card: Card },
    #[error("first lead must be the two of clubs")]
    MustLeadTwoOfClubs,
    #[error("must follow {0}")]
    MustFollowSuit(Suit),
    #[error("hearts have not been broken")]
    HeartsNotBroken,
    #[error("point cards cannot be shed on the first trick")]
    NoPointsOnFirstTrick,
    #[error(transparent)]
    Trick(#[from] TrickError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("{0} appears more than once")]
    DuplicateCard(Card),
    #[error("won piles hold {won} cards but {played} have been played")]
    WonPileMismatch { won: usize, played: usize },
}

impl RoundState {
    /// Deals `deck` round-robin; the holder of the two of clubs leads.
    pub fn deal(deck: &Deck) -> Self {
        Self::from_hands(deck.deal_hands())
    }

    /// Starts a round from already-dealt (and possibly exchanged) hands.
    pub fn from_hands(hands: [Hand; 4]) -> Self {
        let leader = PlayerPosition::LOOP
            .iter()
            .copied()
            .find(|seat| hands[seat.index()].contains(Card::TWO_OF_CLUBS))
            .unwrap_or(PlayerPosition::North);

        Self {
            hands,
            current_trick: Trick::new(leader),
            hearts_broken: false,
            played: Vec::with_capacity(DECK_SIZE),
            won: array::from_fn(|_| Vec::new()),
        }
    }

    pub fn from_parts(parts: RoundParts) -> Result<Self, RoundError> {
        let won_total: usize = parts.won.iter().map(Vec::len).sum();
        if won_total != 0 && won_total != parts.played.len() {
            return Err(RoundError::WonPileMismatch {
                won: won_total,
                played: parts.played.len(),
            });
        }

        let mut seen = 0u64;
        let all_cards = parts
            .hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .chain(parts.current_trick.cards())
            .chain(parts.played.iter().copied());
        for card in all_cards {
            let bit = 1u64 << card.id();
            if seen & bit != 0 {
                return Err(RoundError::DuplicateCard(card));
            }
            seen |= bit;
        }

        Ok(Self {
            hands: parts.hands,
            current_trick: parts.current_trick,
            hearts_broken: parts.hearts_broken,
            played: parts.played,
            won: parts.won,
        })
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn hands(&self) -> &[Hand; 4] {
        &self.hands
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    /// Cards of completed tricks this round, in play order.
    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn won(&self, seat: PlayerPosition) -> &[Card] {
        &self.won[seat.index()]
    }

    pub fn to_act(&self) -> PlayerPosition {
        self.current_trick.expected_position()
    }

    pub fn hearts_broken(&self) -> bool {
        self.hearts_broken
    }

    pub fn is_first_trick(&self) -> bool {
        self.played.is_empty()
    }

    pub fn tricks_completed(&self) -> usize {
        self.played.len() / 4
    }

    pub fn is_terminal(&self) -> bool {
        self.hands.iter().all(Hand::is_empty)
    }

    pub fn points(&self, seat: PlayerPosition) -> u32 {
        self.won[seat.index()]
            .iter()
            .map(|card| u32::from(card.penalty_value()))
            .sum()
    }

    pub fn penalty_totals(&self) -> [u8; 4] {
        array::from_fn(|idx| {
            self.won[idx]
                .iter()
                .map(|card| card.penalty_value())
                .sum()
        })
    }

    /// Cards accounted for across hands, the open trick and history.
    pub fn card_count(&self) -> usize {
        self.hands.iter().map(Hand::len).sum::<usize>()
            + self.current_trick.len()
            + self.played.len()
    }

    /// True when hands, trick and history together hold each of the 52 cards once.
    pub fn is_conserved(&self) -> bool {
        let mut seen = 0u64;
        let mut count = 0usize;
        let all_cards = self
            .hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .chain(self.current_trick.cards())
            .chain(self.played.iter().copied());
        for card in all_cards {
            let bit = 1u64 << card.id();
            if seen & bit != 0 {
                return false;
            }
            seen |= bit;
            count += 1;
        }
        count == DECK_SIZE
    }

    /// Legal cards for the seat to act.
    pub fn legal_moves(&self) -> Vec<Card> {
        let seat = self.to_act();
        rules::legal_moves_for_lead(
            self.hands[seat.index()].cards(),
            self.current_trick.lead_suit(),
            self.hearts_broken,
            self.is_first_trick(),
        )
    }

    /// Returns the state after the seat to act plays `card`.
    pub fn play(&self, card: Card) -> Result<RoundState, PlayError> {
        let mut next = self.clone();
        next.apply(card)?;
        Ok(next)
    }

    /// Plays `card` for the seat to act, resolving the trick on its fourth card.
    pub fn apply(&mut self, card: Card) -> Result<PlayOutcome, PlayError> {
        if self.is_terminal() {
            return Err(PlayError::RoundOver);
        }

        let seat = self.to_act();
        let hand = &self.hands[seat.index()];
        if !hand.contains(card) {
            return Err(PlayError::CardNotInHand { seat, card });
        }
        if !self.legal_moves().contains(&card) {
            return Err(self.illegal_reason(seat, card));
        }

        self.hands[seat.index()].remove(card);
        self.current_trick.play(seat, card)?;

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }
        Ok(self.resolve_trick())
    }

    fn resolve_trick(&mut self) -> PlayOutcome {
        let winner = self
            .current_trick
            .winner()
            .unwrap_or_else(|| self.current_trick.leader());
        let penalties = self.current_trick.penalty_total();
        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner));

        for card in finished.cards() {
            if card.suit.is_heart() {
                self.hearts_broken = true;
            }
            self.won[winner.index()].push(card);
            self.played.push(card);
        }

        PlayOutcome::TrickCompleted { winner, penalties }
    }

    fn illegal_reason(&self, seat: PlayerPosition, card: Card) -> PlayError {
        let hand = &self.hands[seat.index()];
        match self.current_trick.lead_suit() {
            None if self.is_first_trick() && hand.contains(Card::TWO_OF_CLUBS) => {
                PlayError::MustLeadTwoOfClubs
            }
            None => PlayError::HeartsNotBroken,
            Some(suit) if hand.has_suit(suit) && card.suit != suit => PlayError::MustFollowSuit(suit),
            Some(_) => PlayError::NoPointsOnFirstTrick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayError, PlayOutcome, RoundError, RoundParts, RoundState};
    use crate::model::card::{Card, parse_cards};
    use crate::model::deck::Deck;
    use crate::model::hand::Hand;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use crate::model::trick::Trick;
    use std::array;

    fn hand(text: &str) -> Hand {
        Hand::with_cards(parse_cards(text).unwrap())
    }

    #[test]
    fn dealing_distributes_thirteen_cards_per_player() {
        let round = RoundState::deal(&Deck::standard());

        for seat in PlayerPosition::LOOP {
            assert_eq!(round.hand(seat).len(), 13, "{seat} should have 13 cards");
        }
        assert!(round.is_conserved());
        assert_eq!(round.card_count(), 52);
        assert!(round.is_first_trick());
        assert!(round.played().is_empty());
    }

    #[test]
    fn leader_follows_two_of_clubs_holder() {
        let round = RoundState::deal(&Deck::shuffled_with_seed(99));
        let expected = PlayerPosition::LOOP
            .iter()
            .copied()
            .find(|seat| round.hand(*seat).contains(Card::TWO_OF_CLUBS))
            .expect("two of clubs is dealt");

        assert_eq!(round.to_act(), expected);
        assert_eq!(round.current_trick().leader(), expected);
    }

    #[test]
    fn first_lead_must_be_two_of_clubs() {
        let round = RoundState::deal(&Deck::standard());
        let leader = round.to_act();
        let wrong = round
            .hand(leader)
            .iter()
            .copied()
            .find(|&c| c != Card::TWO_OF_CLUBS)
            .unwrap();
        assert_eq!(round.play(wrong), Err(PlayError::MustLeadTwoOfClubs));
        let next = round.play(Card::TWO_OF_CLUBS).unwrap();
        assert_eq!(next.current_trick().len(), 1);
    }

    #[test]
    fn play_leaves_the_source_state_untouched() {
        let round = RoundState::deal(&Deck::shuffled_with_seed(5));
        let before = round.clone();
        let next = round.play(Card::TWO_OF_CLUBS).unwrap();
        assert_eq!(round, before);
        assert_ne!(next, before);
        assert!(next.is_conserved());
    }

    #[test]
    fn follow_suit_is_required() {
        let hands = [
            hand("2C 3H"),
            hand("5C 6D"),
            hand("7C 8D"),
            hand("9C TD"),
        ];
        let round = RoundState::from_hands(hands).play(Card::TWO_OF_CLUBS).unwrap();
        assert_eq!(
            round.play("6D".parse().unwrap()),
            Err(PlayError::MustFollowSuit(Suit::Clubs))
        );
        assert!(round.play("5C".parse().unwrap()).is_ok());
    }

    #[test]
    fn completing_trick_moves_cards_to_winner() {
        let hands = [
            hand("2C 3D"),
            hand("KC 4D"),
            hand("QS 5D"),
            hand("AH 6D"),
        ];
        let mut round = RoundState::from_hands(hands);
        assert_eq!(round.apply(Card::TWO_OF_CLUBS), Ok(PlayOutcome::Played));
        round.apply("KC".parse().unwrap()).unwrap();
        // South and West are void in clubs but hold only points plus one safe card.
        assert_eq!(
            round.apply(Card::QUEEN_OF_SPADES),
            Err(PlayError::NoPointsOnFirstTrick)
        );
        round.apply("5D".parse().unwrap()).unwrap();
        let outcome = round.apply("6D".parse().unwrap()).unwrap();
        assert_eq!(
            outcome,
            PlayOutcome::TrickCompleted {
                winner: PlayerPosition::East,
                penalties: 0
            }
        );
        assert_eq!(round.to_act(), PlayerPosition::East);
        assert!(round.current_trick().is_empty());
        assert_eq!(round.won(PlayerPosition::East).len(), 4);
        assert_eq!(round.played().len(), 4);
        assert!(!round.is_first_trick());
    }

    #[test]
    fn hearts_break_when_a_resolved_trick_holds_one() {
        let hands = [
            hand("2C 3D"),
            hand("KC 4D"),
            hand("5C 5D"),
            hand("AH 9H"),
        ];
        let mut round = RoundState::from_hands(hands);
        for text in ["2C", "KC", "5C"] {
            round.apply(text.parse().unwrap()).unwrap();
        }
        assert!(!round.hearts_broken());
        // West holds only hearts, so the first-trick point ban is lifted.
        round.apply("9H".parse().unwrap()).unwrap();
        assert!(round.hearts_broken());
        assert_eq!(round.points(PlayerPosition::East), 1);
    }

    #[test]
    fn cannot_lead_hearts_before_broken() {
        let mut won: [Vec<Card>; 4] = array::from_fn(|_| Vec::new());
        let played = parse_cards("2C 3C 4C 5C").unwrap();
        won[0] = played.clone();
        let round = RoundState::from_parts(RoundParts {
            hands: [hand("6D 7H"), hand("8D"), hand("9D"), hand("TD")],
            current_trick: Trick::new(PlayerPosition::North),
            hearts_broken: false,
            played,
            won,
        })
        .unwrap();
        assert_eq!(round.legal_moves(), parse_cards("6D").unwrap());
        assert_eq!(
            round.play("7H".parse().unwrap()),
            Err(PlayError::HeartsNotBroken)
        );
    }

    #[test]
    fn from_parts_rejects_duplicates() {
        let err = RoundState::from_parts(RoundParts {
            hands: [hand("2C"), hand("2C"), Hand::new(), Hand::new()],
            current_trick: Trick::new(PlayerPosition::North),
            hearts_broken: false,
            played: Vec::new(),
            won: array::from_fn(|_| Vec::new()),
        })
        .unwrap_err();
        assert_eq!(err, RoundError::DuplicateCard(Card::TWO_OF_CLUBS));
    }

    #[test]
    fn playing_to_the_end_terminates() {
        let mut round = RoundState::deal(&Deck::shuffled_with_seed(7));
        while !round.is_terminal() {
            let card = round.legal_moves()[0];
            round.apply(card).unwrap();
            assert!(round.is_conserved());
        }
        assert_eq!(round.tricks_completed(), 13);
        assert_eq!(round.play(Card::new(Rank::Two, Suit::Clubs)), Err(PlayError::RoundOver));
        let total: u32 = PlayerPosition::LOOP.iter().map(|s| round.points(*s)).sum();
        assert_eq!(total, 26);
    }
}
