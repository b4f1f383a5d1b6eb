use crate::model::player::PlayerPosition;

/// Every heart plus the queen of spades.
pub const TOTAL_ROUND_POINTS: u8 = 26;

/// Seat that captured all 26 points this round, if any.
pub fn moon_shooter(penalties: &[u8; 4]) -> Option<PlayerPosition> {
    PlayerPosition::LOOP
        .iter()
        .copied()
        .find(|seat| penalties[seat.index()] == TOTAL_ROUND_POINTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBoard {
    totals: [u32; 4],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { totals: [0; 4] }
    }

    pub fn add_penalty(&mut self, seat: PlayerPosition, points: u32) {
        self.totals[seat.index()] += points;
    }

    pub fn score(&self, seat: PlayerPosition) -> u32 {
        self.totals[seat.index()]
    }

    pub fn standings(&self) -> &[u32; 4] {
        &self.totals
    }

    pub fn leading_player(&self) -> PlayerPosition {
        PlayerPosition::LOOP
            .iter()
            .copied()
            .min_by_key(|seat| self.score(*seat))
            .unwrap_or(PlayerPosition::North)
    }

    /// Adds one round's captured points; a moon shot charges everyone else 26.
    pub fn apply_hand(&mut self, penalties: [u8; 4]) -> Option<PlayerPosition> {
        if let Some(shooter) = moon_shooter(&penalties) {
            for seat in PlayerPosition::LOOP {
                if seat != shooter {
                    self.add_penalty(seat, u32::from(TOTAL_ROUND_POINTS));
                }
            }
            return Some(shooter);
        }

        for seat in PlayerPosition::LOOP {
            self.add_penalty(seat, u32::from(penalties[seat.index()]));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreBoard, moon_shooter};
    use crate::model::player::PlayerPosition;

    #[test]
    fn leading_player_is_lowest_score() {
        let mut board = ScoreBoard::new();
        board.add_penalty(PlayerPosition::North, 26);
        board.add_penalty(PlayerPosition::West, 1);
        assert_eq!(board.leading_player(), PlayerPosition::East);
    }

    #[test]
    fn apply_hand_adds_penalties_normally() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.apply_hand([1, 5, 0, 20]), None);
        assert_eq!(board.standings(), &[1, 5, 0, 20]);
    }

    #[test]
    fn shoot_the_moon_awards_opponents() {
        let mut board = ScoreBoard::new();
        board.add_penalty(PlayerPosition::South, 10);
        assert_eq!(board.apply_hand([0, 26, 0, 0]), Some(PlayerPosition::East));
        assert_eq!(board.score(PlayerPosition::East), 0);
        assert_eq!(board.score(PlayerPosition::North), 26);
        assert_eq!(board.score(PlayerPosition::South), 36);
        assert_eq!(board.score(PlayerPosition::West), 26);
    }

    #[test]
    fn moon_shooter_requires_all_points() {
        assert_eq!(moon_shooter(&[25, 1, 0, 0]), None);
        assert_eq!(moon_shooter(&[0, 0, 0, 26]), Some(PlayerPosition::West));
    }
}
