use core::fmt;
use serde::{Deserialize, Serialize};

/// Seat at the table, numbered 0..=3 in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PlayerPosition {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl PlayerPosition {
    pub const LOOP: [PlayerPosition; 4] = [
        PlayerPosition::North,
        PlayerPosition::East,
        PlayerPosition::South,
        PlayerPosition::West,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlayerPosition::North),
            1 => Some(PlayerPosition::East),
            2 => Some(PlayerPosition::South),
            3 => Some(PlayerPosition::West),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> PlayerPosition {
        Self::LOOP[(self.index() + 1) % 4]
    }

    pub const fn previous(self) -> PlayerPosition {
        Self::LOOP[(self.index() + 3) % 4]
    }

    pub const fn opposite(self) -> PlayerPosition {
        Self::LOOP[(self.index() + 2) % 4]
    }

    /// All four seats in play order starting with `self`.
    pub fn clockwise(self) -> impl Iterator<Item = PlayerPosition> {
        (0..4).map(move |offset| Self::LOOP[(self.index() + offset) % 4])
    }

    pub const fn label(self) -> &'static str {
        match self {
            PlayerPosition::North => "north",
            PlayerPosition::East => "east",
            PlayerPosition::South => "south",
            PlayerPosition::West => "west",
        }
    }
}

impl fmt::Display for PlayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerPosition::North => "North",
            PlayerPosition::East => "East",
            PlayerPosition::South => "South",
            PlayerPosition::West => "West",
        };
        f.write_str(label)
    }
}
