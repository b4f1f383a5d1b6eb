mod node;
mod tree;

pub use node::{Node, NodeId};
pub use tree::{MoveStat, RootStats, SearchTree};

use crate::difficulty::BotDifficulty;
use crate::reward::RewardModel;

/// UCT exploration constant, roughly sqrt(2).
pub const DEFAULT_EXPLORATION: f64 = 1.41;
pub const MAX_SELECTION_DEPTH: usize = 64;
/// A full round never takes more than 52 plays.
pub const MAX_ROLLOUT_STEPS: usize = 64;
pub const DEFAULT_SAMPLES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Total budget across all samples.
    pub iterations: u32,
    pub samples: u32,
    pub exploration: f64,
    pub max_selection_depth: usize,
    pub max_rollout_steps: usize,
    /// Run samples on the rayon pool.
    pub parallel: bool,
    pub reward: RewardModel,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::for_difficulty(BotDifficulty::default())
    }
}

impl SearchConfig {
    pub fn for_difficulty(difficulty: BotDifficulty) -> Self {
        Self {
            iterations: difficulty.iterations(),
            samples: DEFAULT_SAMPLES,
            exploration: DEFAULT_EXPLORATION,
            max_selection_depth: MAX_SELECTION_DEPTH,
            max_rollout_steps: MAX_ROLLOUT_STEPS,
            parallel: false,
            reward: RewardModel::Differential,
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_reward(mut self, reward: RewardModel) -> Self {
        self.reward = reward;
        self
    }

    pub fn sample_count(&self) -> u32 {
        self.samples.max(1)
    }

    /// Even share of the budget, never below one.
    pub fn iterations_per_sample(&self) -> u32 {
        (self.iterations / self.sample_count()).max(1)
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let difficulty = BotDifficulty::from_reader(&mut read);
        let mut config = Self::for_difficulty(difficulty);

        if let Some(iterations) = read("MDH_MCTS_ITERATIONS")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
        {
            config.iterations = iterations;
        }

        if let Some(samples) = read("MDH_MCTS_SAMPLES")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
        {
            config.samples = samples;
        }

        config.parallel = read("MDH_MCTS_PARALLEL")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        if let Some(reward) = read("MDH_MCTS_REWARD").and_then(|raw| RewardModel::from_name(&raw)) {
            config.reward = reward;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_SAMPLES, SearchConfig};
    use crate::difficulty::BotDifficulty;
    use crate::reward::RewardModel;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> SearchConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SearchConfig::from_reader(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_follow_medium_difficulty() {
        let config = SearchConfig::default();
        assert_eq!(config.iterations, 1500);
        assert_eq!(config.samples, DEFAULT_SAMPLES);
        assert_eq!(config.iterations_per_sample(), 50);
        assert_eq!(config, from_pairs(&[]));
    }

    #[test]
    fn budget_never_drops_below_one_per_sample() {
        let config = SearchConfig::default().with_iterations(10).with_samples(30);
        assert_eq!(config.iterations_per_sample(), 1);
        let config = SearchConfig::default().with_samples(0);
        assert_eq!(config.sample_count(), 1);
    }

    #[test]
    fn environment_overrides_apply() {
        let config = from_pairs(&[
            ("MDH_BOT_DIFFICULTY", "hard"),
            ("MDH_MCTS_SAMPLES", "8"),
            ("MDH_MCTS_PARALLEL", "on"),
            ("MDH_MCTS_REWARD", "weighted"),
        ]);
        assert_eq!(config.iterations, BotDifficulty::Hard.iterations());
        assert_eq!(config.samples, 8);
        assert!(config.parallel);
        assert_eq!(config.reward, RewardModel::weighted());

        let config = from_pairs(&[("MDH_BOT_DIFFICULTY", "easy"), ("MDH_MCTS_ITERATIONS", "64")]);
        assert_eq!(config.iterations, 64);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let config = from_pairs(&[
            ("MDH_MCTS_ITERATIONS", "lots"),
            ("MDH_MCTS_SAMPLES", "0"),
            ("MDH_MCTS_REWARD", "vibes"),
        ]);
        assert_eq!(config, SearchConfig::default());
    }
}
