//! Determinized Monte-Carlo tree search for choosing a card to play.

pub mod determinize;
pub mod difficulty;
pub mod dispatch;
pub mod policy;
pub mod request;
pub mod reward;
pub mod search;
pub mod selector;

pub use determinize::Determinizer;
pub use difficulty::BotDifficulty;
pub use dispatch::{DispatchError, PendingDecision, spawn_decision};
pub use policy::{GreedyRollout, PassStrategy, RolloutPolicy, StaticPassHeuristic};
pub use request::{DecisionRequest, RequestError};
pub use reward::{MOON_BONUS, RewardModel};
pub use search::{SearchConfig, SearchTree};
pub use selector::{Choice, ChoiceReason, MoveScore, MoveScores, Selector};
