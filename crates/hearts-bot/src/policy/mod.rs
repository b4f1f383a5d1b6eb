mod greedy;
mod pass;

pub use greedy::GreedyRollout;
pub use pass::StaticPassHeuristic;

use hearts_core::model::card::Card;
use hearts_core::model::hand::Hand;
use hearts_core::model::passing::PassingDirection;
use hearts_core::model::round::RoundState;
use rand::RngCore;

/// Picks the card for whichever seat is to act during a simulated play-out.
///
/// Implementations are shared across sample workers, so they must be
/// stateless or internally synchronised.
pub trait RolloutPolicy: Send + Sync {
    /// `legal` is the evaluator's legal set for `round.to_act()`; `None` only
    /// when it is empty.
    fn choose(&self, round: &RoundState, legal: &[Card], rng: &mut dyn RngCore) -> Option<Card>;

    fn name(&self) -> &'static str;
}

/// Chooses the three cards handed over before a round.
pub trait PassStrategy: Send + Sync {
    /// `None` when the hand is too short to pass.
    fn choose_pass(&self, hand: &Hand, direction: PassingDirection) -> Option<[Card; 3]>;
}
