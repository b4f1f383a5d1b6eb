use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::passing::{PassingDirection, PassingError, exchange};
use crate::model::player::PlayerPosition;
use crate::model::round::RoundState;
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seeded sequence of rounds with cumulative scoring.
///
/// Each round starts in [`MatchPhase::Passing`] holding the dealt hands; once
/// the exchange is submitted it moves to [`MatchPhase::Playing`].
#[derive(Debug, Clone)]
pub struct MatchState {
    scores: ScoreBoard,
    round_index: usize,
    phase: MatchPhase,
    rng: StdRng,
    seed: u64,
}

#[derive(Debug, Clone)]
pub enum MatchPhase {
    Passing { hands: [Hand; 4] },
    Playing(RoundState),
}

impl MatchState {
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let phase = Self::deal_phase(&mut rng, 0);
        Self {
            scores: ScoreBoard::new(),
            round_index: 0,
            phase,
            rng,
            seed,
        }
    }

    fn deal_phase(rng: &mut StdRng, round_index: usize) -> MatchPhase {
        let hands = Deck::shuffled(rng).deal_hands();
        if PassingDirection::for_round(round_index).requires_selection() {
            MatchPhase::Passing { hands }
        } else {
            MatchPhase::Playing(RoundState::from_hands(hands))
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// One-based round number.
    pub fn round_number(&self) -> usize {
        self.round_index + 1
    }

    pub fn passing_direction(&self) -> PassingDirection {
        PassingDirection::for_round(self.round_index)
    }

    pub fn phase(&self) -> &MatchPhase {
        &self.phase
    }

    /// Hands waiting for the exchange, if the round is still in passing.
    pub fn dealt_hands(&self) -> Option<&[Hand; 4]> {
        match &self.phase {
            MatchPhase::Passing { hands } => Some(hands),
            MatchPhase::Playing(_) => None,
        }
    }

    pub fn submit_passes(&mut self, selections: &[[Card; 3]; 4]) -> Result<(), PassingError> {
        let direction = self.passing_direction();
        if let MatchPhase::Passing { hands } = &mut self.phase {
            exchange(hands, selections, direction)?;
            let hands = std::mem::take(hands);
            self.phase = MatchPhase::Playing(RoundState::from_hands(hands));
        }
        Ok(())
    }

    pub fn round(&self) -> Option<&RoundState> {
        match &self.phase {
            MatchPhase::Playing(round) => Some(round),
            MatchPhase::Passing { .. } => None,
        }
    }

    pub fn round_mut(&mut self) -> Option<&mut RoundState> {
        match &mut self.phase {
            MatchPhase::Playing(round) => Some(round),
            MatchPhase::Passing { .. } => None,
        }
    }

    pub fn is_round_ready_for_scoring(&self) -> bool {
        self.round().is_some_and(RoundState::is_terminal)
    }

    /// Scores the finished round and deals the next; returns the moon shooter.
    pub fn finish_round_and_start_next(&mut self) -> Option<PlayerPosition> {
        let penalties = self.round().map(RoundState::penalty_totals);
        let shooter = penalties.and_then(|penalties| self.scores.apply_hand(penalties));
        self.round_index += 1;
        self.phase = Self::deal_phase(&mut self.rng, self.round_index);
        shooter
    }
}
