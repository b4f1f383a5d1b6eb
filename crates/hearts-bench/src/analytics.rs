use std::f64::consts::SQRT_2;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::function::erf::erfc;
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::tournament::HandOutcome;

const CONFIDENCE_Z: f64 = 1.96;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("result names agent '{0}', which the configuration does not define")]
    UnknownAgent(String),
    #[error("writing {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Running totals per agent, in configuration order.
pub struct AnalyticsCollector {
    baseline: String,
    latency_budget_ms: u64,
    tallies: Vec<AgentTally>,
}

struct AgentTally {
    name: String,
    kind: AgentKind,
    /// One entry per seat played.
    scores: Vec<f64>,
    /// Per deal: this agent's mean score minus the baseline's.
    versus_baseline: Vec<f64>,
    wins: usize,
    moon_shots: usize,
    decisions: u64,
    decision_ms: f64,
    over_budget: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let tallies = config
            .agents
            .iter()
            .map(|agent| AgentTally {
                name: agent.name.clone(),
                kind: agent.kind,
                scores: Vec::new(),
                versus_baseline: Vec::new(),
                wins: 0,
                moon_shots: 0,
                decisions: 0,
                decision_ms: 0.0,
                over_budget: 0,
            })
            .collect();
        Self {
            baseline: config.baseline.clone(),
            latency_budget_ms: config.latency_budget_ms,
            tallies,
        }
    }

    pub fn record_hand(&mut self, outcome: &HandOutcome) -> Result<(), AnalyticsError> {
        let best = outcome.seat_results.iter().map(|seat| seat.score).min();
        // (sum, seats) per tally index; an agent may fill several seats.
        let mut deal_totals = vec![(0.0, 0u32); self.tallies.len()];

        for seat in &outcome.seat_results {
            let index = self
                .tallies
                .iter()
                .position(|tally| tally.name == seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            let tally = &mut self.tallies[index];
            let score = f64::from(seat.score);
            tally.scores.push(score);
            tally.wins += usize::from(Some(seat.score) == best);
            tally.moon_shots += usize::from(outcome.moon_shooter == Some(seat.seat));
            tally.decisions += u64::from(seat.metrics.decisions);
            tally.decision_ms += seat.metrics.total_ms;
            tally.over_budget += u64::from(seat.metrics.over_budget);
            deal_totals[index].0 += score;
            deal_totals[index].1 += 1;
        }

        let mean_of = |(sum, seats): (f64, u32)| (seats > 0).then(|| sum / f64::from(seats));
        let Some(baseline_mean) = self
            .tallies
            .iter()
            .position(|tally| tally.name == self.baseline)
            .and_then(|index| mean_of(deal_totals[index]))
        else {
            return Ok(());
        };
        for (tally, totals) in self.tallies.iter_mut().zip(deal_totals) {
            if tally.name == self.baseline {
                continue;
            }
            if let Some(mean) = mean_of(totals) {
                tally.versus_baseline.push(mean - baseline_mean);
            }
        }
        Ok(())
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let baseline_mean = self
            .tallies
            .iter()
            .find(|tally| tally.name == self.baseline)
            .map(|tally| mean(&tally.scores))
            .unwrap_or(0.0);

        let agents = self
            .tallies
            .into_iter()
            .map(|tally| {
                let mean_score = mean(&tally.scores);
                let is_baseline = tally.name == self.baseline;
                AgentReport {
                    seats: tally.scores.len(),
                    mean_score,
                    ci95: confidence_interval(&tally.scores),
                    delta_vs_baseline: mean_score - baseline_mean,
                    p_value: (!is_baseline).then(|| signed_rank_p_value(&tally.versus_baseline)),
                    paired_deals: tally.versus_baseline.len(),
                    wins: tally.wins,
                    moon_shots: tally.moon_shots,
                    decisions: tally.decisions,
                    mean_decision_ms: if tally.decisions == 0 {
                        0.0
                    } else {
                        tally.decision_ms / tally.decisions as f64
                    },
                    over_budget: tally.over_budget,
                    name: tally.name,
                    kind: tally.kind,
                }
            })
            .collect();

        AnalyticsSummary {
            baseline: self.baseline,
            latency_budget_ms: self.latency_budget_ms,
            agents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub latency_budget_ms: u64,
    pub agents: Vec<AgentReport>,
}

/// Scores are moon-adjusted round points; lower is better.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub seats: usize,
    pub mean_score: f64,
    pub ci95: (f64, f64),
    pub delta_vs_baseline: f64,
    /// Signed-rank test against the baseline; `None` for the baseline itself.
    pub p_value: Option<f64>,
    pub paired_deals: usize,
    pub wins: usize,
    pub moon_shots: usize,
    pub decisions: u64,
    pub mean_decision_ms: f64,
    pub over_budget: u64,
}

impl AnalyticsSummary {
    pub fn agent(&self, name: &str) -> Option<&AgentReport> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = format!(
            "# Tournament Summary\n\nPoints per hand against `{}` (lower is better); \
             decisions over {} ms are counted as over budget.\n\n",
            self.baseline, self.latency_budget_ms
        );
        md.push_str("| Agent | Kind | Seats | Points/hand | 95% CI | Δ | p | Wins | Moons | ms/decision | Over budget |\n");
        md.push_str("|---|---|---|---|---|---|---|---|---|---|---|\n");
        for a in &self.agents {
            let p = a.p_value.map_or_else(|| "-".to_string(), |p| format!("{p:.3}"));
            let _ = writeln!(
                md,
                "| {} | {} | {} | {:.3} | {:.3}..{:.3} | {:+.3} | {} | {} | {} | {:.2} | {}/{} |",
                a.name,
                a.kind.as_str(),
                a.seats,
                a.mean_score,
                a.ci95.0,
                a.ci95.1,
                a.delta_vs_baseline,
                p,
                a.wins,
                a.moon_shots,
                a.mean_decision_ms,
                a.over_budget,
                a.decisions,
            );
        }
        md
    }

    pub fn write_markdown(&self, path: &Path) -> Result<(), AnalyticsError> {
        fs::write(path, self.to_markdown()).map_err(|source| AnalyticsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { 0.0 } else { values.iter().mean() }
}

fn confidence_interval(values: &[f64]) -> (f64, f64) {
    let centre = mean(values);
    if values.len() < 2 {
        return (centre, centre);
    }
    let half_width = CONFIDENCE_Z * values.iter().std_dev() / (values.len() as f64).sqrt();
    (centre - half_width, centre + half_width)
}

/// Two-sided Wilcoxon signed-rank p-value (normal approximation with tie and
/// continuity corrections). Zero differences are dropped.
fn signed_rank_p_value(diffs: &[f64]) -> f64 {
    let mut nonzero: Vec<f64> = diffs.iter().copied().filter(|d| *d != 0.0).collect();
    if nonzero.is_empty() {
        return 1.0;
    }
    nonzero.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut positive_rank_sum = 0.0;
    let mut tie_term = 0.0;
    let mut below = 0usize;
    for group in nonzero.chunk_by(|a, b| a.abs() == b.abs()) {
        let size = group.len() as f64;
        let rank = below as f64 + (size + 1.0) / 2.0;
        positive_rank_sum += rank * group.iter().filter(|d| **d > 0.0).count() as f64;
        tie_term += size.powi(3) - size;
        below += group.len();
    }

    let n = nonzero.len() as f64;
    let expected = n * (n + 1.0) / 4.0;
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0;
    if variance <= 0.0 {
        return 1.0;
    }
    let z = ((positive_rank_sum - expected).abs() - 0.5).max(0.0) / variance.sqrt();
    erfc(z / SQRT_2).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_collapses_for_short_samples() {
        assert_eq!(confidence_interval(&[7.0]), (7.0, 7.0));
        assert_eq!(confidence_interval(&[]), (0.0, 0.0));
    }

    #[test]
    fn interval_brackets_the_mean() {
        let (low, high) = confidence_interval(&[2.0, 4.0, 6.0, 8.0]);
        assert!(((low + high) / 2.0 - 5.0).abs() < 1e-9);
        assert!(low < 5.0 && high > 5.0);
    }

    #[test]
    fn balanced_differences_are_not_significant() {
        assert_eq!(signed_rank_p_value(&[0.0; 10]), 1.0);
        let p = signed_rank_p_value(&[1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
        assert!(p > 0.5, "p = {p}");
    }

    #[test]
    fn one_sided_gap_is_significant() {
        let diffs: Vec<f64> = (1..=30).map(|d| -f64::from(d)).collect();
        let p = signed_rank_p_value(&diffs);
        assert!(p < 0.01, "p = {p}");
    }

    #[test]
    fn markdown_has_a_row_per_agent() {
        let report = |name: &str, kind| AgentReport {
            name: name.to_string(),
            kind,
            seats: 0,
            mean_score: 0.0,
            ci95: (0.0, 0.0),
            delta_vs_baseline: 0.0,
            p_value: None,
            paired_deals: 0,
            wins: 0,
            moon_shots: 0,
            decisions: 0,
            mean_decision_ms: 0.0,
            over_budget: 0,
        };
        let summary = AnalyticsSummary {
            baseline: "greedy".into(),
            latency_budget_ms: 2000,
            agents: vec![report("greedy", AgentKind::Greedy), report("mcts", AgentKind::Mcts)],
        };
        let markdown = summary.to_markdown();
        assert!(markdown.contains("| greedy | greedy |"));
        assert!(markdown.contains("| mcts | mcts |"));
        assert!(summary.agent("mcts").is_some());
    }
}
