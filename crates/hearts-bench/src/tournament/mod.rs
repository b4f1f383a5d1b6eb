mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use hearts_bot::{
    DecisionRequest, GreedyRollout, PassStrategy, RequestError, SearchConfig, Selector,
    StaticPassHeuristic,
};
use hearts_core::game::match_state::MatchState;
use hearts_core::model::card::Card;
use hearts_core::model::player::PlayerPosition;
use hearts_core::model::round::RoundState;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError, AnalyticsSummary};
use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs, ValidationError};

pub use permutations::{MAX_SEAT_PERMUTATIONS, SeatPermutations};

const SEAT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Plays seeded deals under every requested seating and records the results.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub hands_played: usize,
    pub seatings: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub analytics: AnalyticsSummary,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        if agents.is_empty() || agents.len() > 4 {
            return Err(RunnerError::TableSize(agents.len()));
        }
        if config.seatings > MAX_SEAT_PERMUTATIONS {
            return Err(RunnerError::TooManySeatings(config.seatings));
        }

        let seat_permutations = SeatPermutations::new(config.seatings);
        Ok(Self {
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        if !self.outputs.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for hand_index in 0..self.config.hands {
            let base_seed = rng.next_u64();
            for (perm_index, perm) in permutations.iter().enumerate() {
                let deal = DealId {
                    hand_index,
                    permutation_index: perm_index,
                    base_seed,
                };
                let outcome = self.play_hand(&deal, perm)?;
                analytics.record_hand(&outcome)?;
                rows_written += write_hand_rows(&mut writer, &self.config.run_id, &deal, &outcome)?;
            }
        }
        writer.flush()?;

        let analytics = analytics.finalize();
        analytics.write_markdown(&self.outputs.summary_md)?;
        event!(
            target: "hearts_bench::run",
            Level::INFO,
            run_id = %self.config.run_id,
            hands = self.config.hands as u64,
            permutations = permutations.len() as u64,
            rows = rows_written as u64,
            "tournament complete"
        );

        Ok(RunSummary {
            hands_played: self.config.hands,
            seatings: permutations.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            analytics,
        })
    }

    fn play_hand(&self, deal: &DealId, permutation: &[usize; 4]) -> Result<HandOutcome, RunnerError> {
        let mut match_state = MatchState::with_seed(deal.base_seed);
        let mut seats = build_seat_states(permutation, &self.agents, deal.base_seed)?;

        if let Some(hands) = match_state.dealt_hands() {
            let direction = match_state.passing_direction();
            let mut selections = [[Card::TWO_OF_CLUBS; 3]; 4];
            for seat in &mut seats {
                let start = Instant::now();
                let picks = StaticPassHeuristic
                    .choose_pass(&hands[seat.seat.index()], direction)
                    .ok_or_else(|| {
                        RunnerError::game(format!("{} has too few cards to pass", seat.seat))
                    })?;
                seat.metrics.record(start.elapsed(), self.config.latency_budget_ms);
                selections[seat.seat.index()] = picks;
            }
            match_state
                .submit_passes(&selections)
                .map_err(|err| RunnerError::game(format!("pass submission failed: {err}")))?;
        }

        loop {
            let round = match_state
                .round()
                .ok_or_else(|| RunnerError::game("round missing after passing".to_string()))?;
            if round.is_terminal() {
                break;
            }
            let to_act = round.to_act();
            let seat_state = &mut seats[to_act.index()];

            let start = Instant::now();
            let card = seat_state.choose_play(round)?;
            let elapsed_ms = seat_state
                .metrics
                .record(start.elapsed(), self.config.latency_budget_ms);
            event!(
                target: "hearts_bench::play",
                Level::DEBUG,
                run_id = %self.config.run_id,
                hand_index = deal.hand_index as u64,
                permutation_index = deal.permutation_index as u64,
                seat = to_act.label(),
                bot = %seat_state.agent_name,
                card = %card,
                elapsed_ms
            );

            let round = match_state
                .round_mut()
                .ok_or_else(|| RunnerError::game("round vanished mid-play".to_string()))?;
            if let Err(err) = round.apply(card) {
                let trick = round.current_trick();
                return Err(RunnerError::game(format!(
                    "invalid card play by {to_act}: {card} ({err}); leader={}, plays={:?}",
                    trick.leader(),
                    trick.plays()
                )));
            }
        }

        let penalties = match_state
            .round()
            .map(RoundState::penalty_totals)
            .ok_or_else(|| RunnerError::game("round missing at scoring".to_string()))?;
        let moon_shooter = match_state.finish_round_and_start_next();
        let standings = *match_state.scores().standings();

        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat.seat.label().to_string(),
                bot: seat.agent_name.clone(),
            })
            .collect();
        let seat_results = seats
            .into_iter()
            .map(|seat| SeatResult {
                points: penalties[seat.seat.index()],
                score: standings[seat.seat.index()],
                metrics: seat.metrics.finalize(),
                agent_name: seat.agent_name,
                seat: seat.seat,
            })
            .collect();

        if let Some(shooter) = moon_shooter {
            event!(
                target: "hearts_bench::play",
                Level::INFO,
                run_id = %self.config.run_id,
                hand_index = deal.hand_index as u64,
                seat = shooter.label(),
                "moon shot"
            );
        }

        Ok(HandOutcome {
            seating,
            seat_results,
            penalties,
            moon_shooter,
        })
    }
}

struct DealId {
    hand_index: usize,
    permutation_index: usize,
    base_seed: u64,
}

impl DealId {
    fn label(&self) -> String {
        format!("H{:05}_P{:02}", self.hand_index, self.permutation_index)
    }
}

fn write_hand_rows(
    writer: &mut impl Write,
    run_id: &str,
    deal: &DealId,
    outcome: &HandOutcome,
) -> Result<usize, RunnerError> {
    let deal_id = deal.label();
    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = DealLogRow {
            run_id,
            deal_id: &deal_id,
            hand_index: deal.hand_index,
            permutation_index: deal.permutation_index,
            deal_seed: deal.base_seed,
            seat: seat_result.seat.label(),
            bot: &seat_result.agent_name,
            seating: &outcome.seating,
            points: seat_result.points,
            score: seat_result.score,
            moon: outcome.moon_shooter == Some(seat_result.seat),
            pph: f64::from(seat_result.score),
            ms_per_decision: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
            over_budget: seat_result.metrics.over_budget,
        };
        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }
    Ok(rows_written)
}

/// Seat `i` plays `lineup[permutation[i]]`, where the lineup repeats the
/// configured agents until four slots are filled.
fn build_seat_states<'a>(
    permutation: &[usize; 4],
    agents: &'a [AgentBlueprint],
    base_seed: u64,
) -> Result<Vec<SeatState<'a>>, RunnerError> {
    let mut seats = Vec::with_capacity(4);
    for (seat_idx, slot) in permutation.iter().enumerate() {
        let seat = PlayerPosition::from_index(seat_idx).ok_or_else(|| {
            RunnerError::game(format!("invalid seat index generated: {seat_idx}"))
        })?;
        let agent = agents
            .get(slot % agents.len().max(1))
            .ok_or(RunnerError::BadSeating {
                seat: seat_idx,
                slot: *slot,
            })?;
        let seed = base_seed ^ SEAT_SEED_SALT.wrapping_mul(seat_idx as u64 + 1);
        seats.push(SeatState::new(seat, agent, seed));
    }
    Ok(seats)
}

struct SeatState<'a> {
    seat: PlayerPosition,
    agent_name: String,
    agent: &'a AgentBlueprint,
    rng: StdRng,
    metrics: DecisionMetrics,
}

impl<'a> SeatState<'a> {
    fn new(seat: PlayerPosition, agent: &'a AgentBlueprint, seed: u64) -> Self {
        Self {
            seat,
            agent_name: agent.name.clone(),
            agent,
            rng: StdRng::seed_from_u64(seed),
            metrics: DecisionMetrics::default(),
        }
    }

    fn choose_play(&mut self, round: &RoundState) -> Result<Card, RunnerError> {
        let card = match &self.agent.implementation {
            AgentImplementation::Mcts(selector) => {
                let request = DecisionRequest::from_round(round, self.seat);
                selector
                    .choose(&request, &mut self.rng)
                    .map_err(|source| AgentError::Decision {
                        name: self.agent_name.clone(),
                        source,
                    })?
                    .map(|choice| choice.card)
            }
            AgentImplementation::Greedy => GreedyRollout::pick(round, &round.legal_moves()),
        };
        card.ok_or_else(|| RunnerError::game(format!("{} had no card to play", self.seat)))
    }
}

pub struct HandOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub penalties: [u8; 4],
    pub moon_shooter: Option<PlayerPosition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: PlayerPosition,
    /// Penalty points taken in the round.
    pub points: u8,
    /// Points after the moon adjustment.
    pub score: u32,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
    over_budget: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration, budget_ms: u64) -> f64 {
        self.total += duration;
        self.decisions += 1;
        if duration > Duration::from_millis(budget_ms) {
            self.over_budget += 1;
        }
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let total_ms = self.total.as_secs_f64() * 1000.0;
        let avg_ms_per_decision = if self.decisions == 0 {
            0.0
        } else {
            total_ms / f64::from(self.decisions)
        };
        DecisionSummary {
            decisions: self.decisions,
            over_budget: self.over_budget,
            avg_ms_per_decision,
            total_ms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub over_budget: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct DealLogRow<'a> {
    run_id: &'a str,
    deal_id: &'a str,
    hand_index: usize,
    permutation_index: usize,
    deal_seed: u64,
    seat: &'static str,
    bot: &'a str,
    seating: &'a [SeatSnapshot],
    points: u8,
    score: u32,
    moon: bool,
    pph: f64,
    ms_per_decision: f64,
    decisions: u32,
    over_budget: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("writing results: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding a deal row: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("deal broke down: {message}")]
    Game { message: String },
    #[error("a table seats one to four agents, found {0}")]
    TableSize(usize),
    #[error("{0} seatings requested, only 24 distinct ones exist")]
    TooManySeatings(usize),
    #[error("seat {seat} maps to missing lineup slot {slot}")]
    BadSeating { seat: usize, slot: usize },
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameters for agent '{name}': {source}")]
    InvalidParams {
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("agent '{name}' rejected the decision request: {source}")]
    Decision {
        name: String,
        #[source]
        source: RequestError,
    },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Mcts(Selector),
    Greedy,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Mcts => {
                let search: SearchConfig =
                    config
                        .search_config()
                        .map_err(|source| AgentError::InvalidParams {
                            name: config.name.clone(),
                            source,
                        })?;
                event!(
                    target: "hearts_bench::run",
                    Level::DEBUG,
                    agent = %config.name,
                    iterations = search.iterations,
                    samples = search.samples,
                    parallel = search.parallel,
                    reward = search.reward.label(),
                    "mcts agent configured"
                );
                AgentImplementation::Mcts(Selector::new(search))
            }
            AgentKind::Greedy => AgentImplementation::Greedy,
        };
        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }
}
