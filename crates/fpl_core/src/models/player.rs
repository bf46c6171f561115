use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season-stable player identifier.
///
/// Decision files key players by the decimal string form, so `FromStr` and
/// `Display` round-trip through that representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(PlayerId)
    }
}

impl From<u32> for PlayerId {
    fn from(id: u32) -> Self {
        PlayerId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    GK,
    DEF,
    MID,
    FWD,
}

impl Position {
    /// Fixed reporting order (GK, DEF, MID, FWD).
    pub const ALL: [Position; 4] = [Position::GK, Position::DEF, Position::MID, Position::FWD];

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::GK)
    }

    pub fn is_outfield(&self) -> bool {
        !self.is_goalkeeper()
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GKP" => Ok(Position::GK),
            "DEF" => Ok(Position::DEF),
            "MID" => Ok(Position::MID),
            "FWD" => Ok(Position::FWD),
            other => Err(format!("unknown position: {other}")),
        }
    }
}

/// One player's data for one gameweek.
///
/// Costs are integer tenths of a currency unit (55 = 5.5m). `expected_points`
/// is the forecast an upstream optimizer ranked the player by; in oracle runs
/// it simply mirrors `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub club: String,
    pub cost: i32,
    pub points: i32,
    pub minutes: u32,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub expected_points: f64,
}

fn default_available() -> bool {
    true
}

impl PlayerSnapshot {
    pub fn played(&self) -> bool {
        self.minutes > 0
    }
}
