//! Runs the tree search over many sampled deals and merges the root statistics.

use crate::determinize::Determinizer;
use crate::policy::{GreedyRollout, RolloutPolicy};
use crate::request::{DecisionRequest, RequestError};
use crate::search::{RootStats, SearchConfig, SearchTree};
use hearts_core::model::card::Card;
use hearts_core::rules;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{Level, event};

/// Merged statistics for one candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveScore {
    /// Sum over samples of the move's mean reward.
    pub aggregate: f64,
    pub visits: u64,
    pub samples: u32,
}

/// Candidate statistics keyed by card. Merging is order-independent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveScores {
    entries: BTreeMap<Card, MoveScore>,
}

impl MoveScores {
    pub fn from_root(stats: &RootStats) -> Self {
        let entries = stats
            .moves
            .iter()
            .filter(|stat| stat.visits > 0)
            .map(|stat| {
                (
                    stat.card,
                    MoveScore {
                        aggregate: stat.mean_reward(),
                        visits: u64::from(stat.visits),
                        samples: 1,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn merge(mut self, other: MoveScores) -> MoveScores {
        for (card, score) in other.entries {
            let entry = self.entries.entry(card).or_default();
            entry.aggregate += score.aggregate;
            entry.visits += score.visits;
            entry.samples += score.samples;
        }
        self
    }

    pub fn get(&self, card: Card) -> Option<&MoveScore> {
        self.entries.get(&card)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Card, &MoveScore)> + '_ {
        self.entries.iter().map(|(card, score)| (*card, score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest aggregate among `allowed`; ties go to more visits, then to the
    /// lower card.
    pub fn best(&self, allowed: &[Card]) -> Option<(Card, MoveScore)> {
        let mut best: Option<(Card, MoveScore)> = None;
        for (card, score) in self.iter().filter(|(card, _)| allowed.contains(card)) {
            let better = match best {
                None => true,
                Some((_, current)) => {
                    score.aggregate > current.aggregate
                        || (score.aggregate == current.aggregate && score.visits > current.visits)
                }
            };
            if better {
                best = Some((card, *score));
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceReason {
    Searched,
    /// Exactly one legal card; no search was run.
    ForcedMove,
    /// The rules produced no legal card for a non-empty hand.
    RulesFallback,
}

impl ChoiceReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Searched => "searched",
            Self::ForcedMove => "forced",
            Self::RulesFallback => "rules_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub card: Card,
    pub reason: ChoiceReason,
    /// Search iterations actually run across all samples.
    pub iterations: u64,
    pub samples: u32,
    pub scores: MoveScores,
}

impl Choice {
    fn immediate(card: Card, reason: ChoiceReason) -> Self {
        Self {
            card,
            reason,
            iterations: 0,
            samples: 0,
            scores: MoveScores::default(),
        }
    }
}

pub struct Selector {
    config: SearchConfig,
    policy: Box<dyn RolloutPolicy>,
}

impl Selector {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_policy(config, Box::new(GreedyRollout))
    }

    pub fn with_policy(config: SearchConfig, policy: Box<dyn RolloutPolicy>) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Picks a card for `request.seat`. `Ok(None)` means the hand is empty.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        request: &DecisionRequest,
        rng: &mut R,
    ) -> Result<Option<Choice>, RequestError> {
        let Some(&first_in_hand) = request.hand.first() else {
            event!(
                target: "hearts_bot::selector",
                Level::DEBUG,
                seat = request.seat.label(),
                "empty hand, no decision"
            );
            return Ok(None);
        };
        request.validate()?;

        let legal = rules::legal_moves(
            &request.hand,
            &request.trick_cards(),
            request.hearts_broken,
            request.is_first_trick(),
        );
        if legal.is_empty() {
            event!(
                target: "hearts_bot::selector",
                Level::ERROR,
                seat = request.seat.label(),
                hand = ?request.hand,
                "no legal move for a non-empty hand"
            );
            return Ok(Some(Choice::immediate(first_in_hand, ChoiceReason::RulesFallback)));
        }
        if let [only] = legal.as_slice() {
            return Ok(Some(Choice::immediate(*only, ChoiceReason::ForcedMove)));
        }

        let started = Instant::now();
        let samples = self.config.sample_count();
        let per_sample = self.config.iterations_per_sample();
        let seeds: Vec<u64> = (0..samples).map(|_| rng.next_u64()).collect();

        let per_seed: Vec<MoveScores> = if self.config.parallel {
            seeds
                .par_iter()
                .map(|&seed| self.run_sample(request, seed, per_sample))
                .collect::<Result<_, _>>()?
        } else {
            seeds
                .iter()
                .map(|&seed| self.run_sample(request, seed, per_sample))
                .collect::<Result<_, _>>()?
        };
        let scores = per_seed
            .into_iter()
            .fold(MoveScores::default(), MoveScores::merge);

        let (card, best) = scores
            .best(&legal)
            .unwrap_or((legal[0], MoveScore::default()));

        event!(
            target: "hearts_bot::selector",
            Level::INFO,
            seat = request.seat.label(),
            card = %card,
            aggregate = best.aggregate,
            visits = best.visits,
            legal = legal.len(),
            samples,
            iterations_per_sample = per_sample,
            parallel = self.config.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
        );

        Ok(Some(Choice {
            card,
            reason: ChoiceReason::Searched,
            iterations: u64::from(samples) * u64::from(per_sample),
            samples,
            scores,
        }))
    }

    fn run_sample(
        &self,
        request: &DecisionRequest,
        seed: u64,
        iterations: u32,
    ) -> Result<MoveScores, RequestError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = Determinizer::sample(request, &mut rng)?;
        let mut tree = SearchTree::new(state, request.seat, &self.config);
        let stats = tree.run(iterations, self.policy.as_ref(), &self.config.reward, &mut rng);
        Ok(MoveScores::from_root(&stats))
    }
}
