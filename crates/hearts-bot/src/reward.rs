use hearts_core::model::player::PlayerPosition;
use hearts_core::model::round::RoundState;
use hearts_core::model::score::TOTAL_ROUND_POINTS;

/// Reward for capturing every point card. Any normal outcome is bounded by 26.
pub const MOON_BONUS: f64 = 100.0;

pub const DEFAULT_QUEEN_WEIGHT: f64 = 75.0;
pub const DEFAULT_HEART_WEIGHT: f64 = 1.0;

/// Terminal evaluation of a rollout from the searching seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RewardModel {
    /// Others' round points minus our own.
    #[default]
    Differential,
    /// Others' round points minus a weighted tally of our own captures.
    WeightedPenalty { queen_weight: f64, heart_weight: f64 },
}

impl RewardModel {
    pub const fn weighted() -> Self {
        Self::WeightedPenalty {
            queen_weight: DEFAULT_QUEEN_WEIGHT,
            heart_weight: DEFAULT_HEART_WEIGHT,
        }
    }

    /// Parses the names accepted by configuration (`differential`, `weighted`).
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "differential" | "diff" => Some(Self::Differential),
            "weighted" | "weighted_penalty" => Some(Self::weighted()),
            _ => None,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Differential => "differential",
            Self::WeightedPenalty { .. } => "weighted",
        }
    }

    pub fn evaluate(&self, round: &RoundState, seat: PlayerPosition) -> f64 {
        let own = round.points(seat);
        if own == u32::from(TOTAL_ROUND_POINTS) {
            return MOON_BONUS;
        }

        let others: u32 = PlayerPosition::LOOP
            .iter()
            .filter(|other| **other != seat)
            .map(|other| round.points(*other))
            .sum();

        match *self {
            Self::Differential => f64::from(others) - f64::from(own),
            Self::WeightedPenalty {
                queen_weight,
                heart_weight,
            } => {
                let won = round.won(seat);
                let queens = won.iter().filter(|c| c.is_queen_of_spades()).count() as f64;
                let hearts = won.iter().filter(|c| c.suit.is_heart()).count() as f64;
                f64::from(others) - (queens * queen_weight + hearts * heart_weight)
            }
        }
    }
}

/// Largest magnitude the differential can reach without a moon.
pub fn differential_bound() -> f64 {
    f64::from(TOTAL_ROUND_POINTS)
}
