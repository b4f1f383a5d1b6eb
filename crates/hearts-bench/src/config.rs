use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use hearts_bot::{BotDifficulty, RewardModel, SearchConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::tournament::MAX_SEAT_PERMUTATIONS;

/// A tournament file.
///
/// ```yaml
/// run_id: mcts_vs_greedy
/// seed: 7
/// hands: 100
/// output_dir: bench/out/{run_id}
/// baseline: greedy
/// agents:
///   - { name: greedy, kind: greedy }
///   - { name: mcts, kind: mcts, difficulty: hard, parallel: true }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    pub run_id: String,
    #[serde(default)]
    pub seed: u64,
    pub hands: usize,
    /// Seatings played per deal, rotations first.
    #[serde(default = "BenchmarkConfig::default_seatings")]
    pub seatings: usize,
    /// Directory for the outputs; `{run_id}` is substituted.
    pub output_dir: String,
    pub baseline: String,
    /// Decisions slower than this are counted against the agent.
    #[serde(default = "BenchmarkConfig::default_latency_budget_ms")]
    pub latency_budget_ms: u64,
    /// Writes `events.jsonl` at this level when set.
    #[serde(default)]
    pub log_level: Option<String>,
    pub agents: Vec<AgentConfig>,
}

/// One seat-filling agent. Search fields are only meaningful for `mcts`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    pub difficulty: Option<String>,
    pub iterations: Option<u32>,
    pub samples: Option<u32>,
    pub parallel: Option<bool>,
    pub reward: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Determinized tree search.
    #[default]
    Mcts,
    /// The rollout policy playing on its own.
    Greedy,
}

impl AgentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentKind::Mcts => "mcts",
            AgentKind::Greedy => "greedy",
        }
    }
}

/// Files written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub dir: PathBuf,
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub events: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path:?} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl BenchmarkConfig {
    const fn default_seatings() -> usize {
        4
    }

    const fn default_latency_budget_ms() -> u64 {
        2_000
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let valid_id = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
        if self.run_id.is_empty() || !self.run_id.chars().all(valid_id) {
            return Err(ValidationError::new(
                "run_id",
                "must be non-empty and use only letters, digits, '.', '_' or '-'",
            ));
        }
        if self.hands == 0 {
            return Err(ValidationError::new("hands", "must be at least 1"));
        }
        if !(1..=MAX_SEAT_PERMUTATIONS).contains(&self.seatings) {
            return Err(ValidationError::new(
                "seatings",
                format!("must be between 1 and {MAX_SEAT_PERMUTATIONS}"),
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ValidationError::new("output_dir", "must not be empty"));
        }
        if self.latency_budget_ms == 0 {
            return Err(ValidationError::new("latency_budget_ms", "must be at least 1"));
        }
        if let Some(raw) = &self.log_level {
            raw.parse::<Level>()
                .map_err(|_| ValidationError::new("log_level", format!("unknown level '{raw}'")))?;
        }

        if !(1..=4).contains(&self.agents.len()) {
            return Err(ValidationError::new("agents", "a table seats one to four agents"));
        }
        let mut names = HashSet::new();
        for agent in &self.agents {
            if !names.insert(agent.name.as_str()) {
                return Err(ValidationError::new(
                    "agents",
                    format!("'{}' is listed twice", agent.name),
                ));
            }
            agent.validate()?;
        }
        if !names.contains(self.baseline.as_str()) {
            return Err(ValidationError::new(
                "baseline",
                format!("'{}' is not one of the agents", self.baseline),
            ));
        }
        Ok(())
    }

    pub fn outputs(&self) -> ResolvedOutputs {
        let dir = PathBuf::from(self.output_dir.replace("{run_id}", &self.run_id));
        ResolvedOutputs {
            jsonl: dir.join("deals.jsonl"),
            summary_md: dir.join("summary.md"),
            events: dir.join("events.jsonl"),
            dir,
        }
    }

    pub fn log_level(&self) -> Option<Level> {
        self.log_level.as_deref().and_then(|raw| raw.parse().ok())
    }
}

impl AgentConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("agents", "agent names must not be empty"));
        }
        match self.kind {
            AgentKind::Mcts => self.search_config().map(drop),
            AgentKind::Greedy => {
                let tuned = self.difficulty.is_some()
                    || self.iterations.is_some()
                    || self.samples.is_some()
                    || self.parallel.is_some()
                    || self.reward.is_some();
                if tuned {
                    Err(self.invalid("kind", "search settings only apply to mcts agents"))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// The difficulty preset with any explicit overrides applied.
    pub fn search_config(&self) -> Result<SearchConfig, ValidationError> {
        let difficulty = match self.difficulty.as_deref() {
            None => BotDifficulty::default(),
            Some(raw) => BotDifficulty::from_name(raw)
                .ok_or_else(|| self.invalid("difficulty", format!("unknown difficulty '{raw}'")))?,
        };
        let mut config = SearchConfig::for_difficulty(difficulty);

        match self.iterations {
            Some(0) => return Err(self.invalid("iterations", "must be at least 1")),
            Some(iterations) => config = config.with_iterations(iterations),
            None => {}
        }
        match self.samples {
            Some(0) => return Err(self.invalid("samples", "must be at least 1")),
            Some(samples) => config = config.with_samples(samples),
            None => {}
        }
        if let Some(parallel) = self.parallel {
            config = config.with_parallel(parallel);
        }
        if let Some(raw) = self.reward.as_deref() {
            let reward = RewardModel::from_name(raw)
                .ok_or_else(|| self.invalid("reward", format!("unknown reward model '{raw}'")))?;
            config = config.with_reward(reward);
        }
        Ok(config)
    }

    fn invalid(&self, field: &str, message: impl Into<String>) -> ValidationError {
        ValidationError::new(format!("agents.{}.{field}", self.name), message)
    }
}
