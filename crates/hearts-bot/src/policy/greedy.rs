use super::RolloutPolicy;
use hearts_core::model::card::Card;
use hearts_core::model::round::RoundState;
use rand::RngCore;

/// Point-avoiding play used for every seat in rollouts.
///
/// Leads low and safe, ducks under the current winner when following, and
/// sheds the most dangerous card when void.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRollout;

impl GreedyRollout {
    pub fn pick(round: &RoundState, legal: &[Card]) -> Option<Card> {
        let trick = round.current_trick();
        match trick.lead_suit() {
            None => lead(legal),
            Some(suit) => {
                let following: Vec<Card> =
                    legal.iter().copied().filter(|c| c.suit == suit).collect();
                if following.is_empty() {
                    return slough(legal);
                }
                let best = trick.winning_play().map(|play| play.card.rank);
                let duck = following
                    .iter()
                    .copied()
                    .filter(|card| best.is_some_and(|rank| card.rank < rank))
                    .max_by_key(|card| card.rank);
                duck.or_else(|| following.iter().copied().min_by_key(|card| card.rank))
            }
        }
    }
}

impl RolloutPolicy for GreedyRollout {
    fn choose(&self, round: &RoundState, legal: &[Card], _rng: &mut dyn RngCore) -> Option<Card> {
        Self::pick(round, legal)
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

fn lead(legal: &[Card]) -> Option<Card> {
    legal
        .iter()
        .copied()
        .filter(|card| !card.is_penalty())
        .min_by_key(|card| (card.rank, *card))
        .or_else(|| legal.iter().copied().min_by_key(|card| (card.rank, *card)))
}

fn slough(legal: &[Card]) -> Option<Card> {
    if let Some(queen) = legal.iter().copied().find(|card| card.is_queen_of_spades()) {
        return Some(queen);
    }
    legal
        .iter()
        .copied()
        .filter(|card| card.suit.is_heart())
        .max_by_key(|card| card.rank)
        .or_else(|| legal.iter().copied().max_by_key(|card| (card.rank, *card)))
}
