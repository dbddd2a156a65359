use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod bot;
pub mod cards;
pub mod rules;
pub mod simulation;
pub mod table;
pub mod trace;

pub const NUM_PLAYERS: usize = 4;

/// Seats around the table, clockwise. The human always sits in `Seat::Player`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum Seat {
    Player = 0,
    Opponent1,
    #[serde(rename = "Team Mate")]
    TeamMate,
    Opponent2,
}

pub const SEATS: [Seat; NUM_PLAYERS] = [
    Seat::Player,
    Seat::Opponent1,
    Seat::TeamMate,
    Seat::Opponent2,
];

impl Seat {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Seat {
        SEATS[idx % NUM_PLAYERS]
    }

    /// The seat to the left, next to act
    pub fn next(&self) -> Seat {
        Seat::from_index(self.index() + 1)
    }

    pub fn partner(&self) -> Seat {
        Seat::from_index(self.index() + 2)
    }

    pub fn team(&self) -> Team {
        Team::from(*self)
    }

    pub fn is_human(&self) -> bool {
        *self == Seat::Player
    }

    pub fn name(&self) -> &str {
        match self {
            Seat::Player => "Player",
            Seat::Opponent1 => "Opponent1",
            Seat::TeamMate => "Team Mate",
            Seat::Opponent2 => "Opponent2",
        }
    }

    /// All four seats in clockwise order starting with `self`
    pub fn clockwise(&self) -> [Seat; NUM_PLAYERS] {
        let mut order = SEATS;
        order.rotate_left(self.index());
        order
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Team {
    Team1,
    Team2,
}

impl Team {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn other(&self) -> Team {
        match self {
            Team::Team1 => Team::Team2,
            Team::Team2 => Team::Team1,
        }
    }
}

impl From<Seat> for Team {
    fn from(val: Seat) -> Self {
        if val.index() % 2 == 0 {
            Team::Team1
        } else {
            Team::Team2
        }
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Team1 => f.write_str("Team 1"),
            Team::Team2 => f.write_str("Team 2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_rotation() {
        assert_eq!(Seat::Player.next(), Seat::Opponent1);
        assert_eq!(Seat::Opponent2.next(), Seat::Player);
        assert_eq!(Seat::Opponent1.partner(), Seat::Opponent2);
        assert_eq!(Seat::TeamMate.partner(), Seat::Player);
        assert_eq!(
            Seat::TeamMate.clockwise(),
            [Seat::TeamMate, Seat::Opponent2, Seat::Player, Seat::Opponent1]
        );
    }

    #[test]
    fn test_teams() {
        assert_eq!(Seat::Player.team(), Team::Team1);
        assert_eq!(Seat::TeamMate.team(), Team::Team1);
        assert_eq!(Seat::Opponent1.team(), Team::Team2);
        assert_eq!(Seat::Opponent2.team(), Team::Team2);
        assert_eq!(Team::Team1.other(), Team::Team2);
    }

    #[test]
    fn test_seat_serde_names() {
        assert_eq!(
            serde_json::to_string(&Seat::TeamMate).unwrap(),
            "\"Team Mate\""
        );
        let s: Seat = serde_json::from_str("\"Opponent1\"").unwrap();
        assert_eq!(s, Seat::Opponent1);
    }
}
