use crate::models::{PlayerId, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Position-count rule broken by a (possibly partial) lineup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormationError {
    #[error("formation must have exactly {expected} GK, found {found}")]
    GoalkeeperCount { expected: usize, found: usize },

    #[error("formation must have {min}-{max} {position}, found {found}")]
    OutOfBounds { position: Position, min: usize, max: usize, found: usize },
}

/// A club over the per-club squad limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubCount {
    pub club: String,
    pub count: usize,
}

impl fmt::Display for ClubCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.club, self.count)
    }
}

fn join_clubs(violations: &[ClubCount]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Team rule violations, one variant per check in validation order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Squad must have exactly {expected} players, found {found}")]
    SquadSize { expected: usize, found: usize },

    #[error("Squad must have {expected} {position}, found {found}")]
    SquadComposition { position: Position, expected: usize, found: usize },

    #[error("Maximum {limit} players per club. Violations: {}", join_clubs(.violations))]
    ClubLimit { limit: usize, violations: Vec<ClubCount> },

    #[error("Starting XI must have exactly {expected} players, found {found}")]
    StartingSize { expected: usize, found: usize },

    #[error("Starting XI {0}")]
    Formation(FormationError),

    #[error("Bench positions must be [1,2,3,4], found {found:?}")]
    BenchSlots { found: Vec<u8> },

    #[error("Bench position 1 must be GK, found {found} (ID: {player})")]
    BenchGoalkeeper { player: PlayerId, found: Position },

    #[error("Bench position {slot} must be outfield player, found GK (ID: {player})")]
    BenchOutfield { slot: u8, player: PlayerId },

    #[error("Captain and vice-captain must be different players (ID: {player})")]
    CaptainIsVice { player: PlayerId },

    #[error("Captain (ID: {captain}) must be in starting XI")]
    CaptainNotStarting { captain: PlayerId },

    #[error("Vice-captain (ID: {vice}) must be in starting XI")]
    ViceNotStarting { vice: PlayerId },
}

impl ValidationError {
    /// 1-based index of the failed check in validation order.
    pub fn rule(&self) -> u8 {
        match self {
            ValidationError::SquadSize { .. } => 1,
            ValidationError::SquadComposition { .. } => 2,
            ValidationError::ClubLimit { .. } => 3,
            ValidationError::StartingSize { .. } => 4,
            ValidationError::Formation(_) => 5,
            ValidationError::BenchSlots { .. } => 6,
            ValidationError::BenchGoalkeeper { .. } => 7,
            ValidationError::BenchOutfield { .. } => 8,
            ValidationError::CaptainIsVice { .. } => 9,
            ValidationError::CaptainNotStarting { .. } => 10,
            ValidationError::ViceNotStarting { .. } => 11,
        }
    }
}

/// Input data that cannot be interpreted at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("Player {player} not found in gameweek {gameweek} data")]
    UnknownPlayer { player: PlayerId, gameweek: u8 },

    #[error("Player {player} appears more than once in {context}")]
    DuplicatePlayer { player: PlayerId, context: &'static str },

    #[error("No player data for gameweek {gameweek}")]
    MissingGameweekData { gameweek: u8 },

    #[error("Bench slot {slot} is not assigned")]
    MissingBenchSlot { slot: u8 },

    #[error("Bench player {player} is also in the starting XI")]
    BenchPlayerStarting { player: PlayerId },

    #[error("Bench player {player} is not in the squad")]
    BenchPlayerNotInSquad { player: PlayerId },

    #[error("Bench must have exactly {expected} players, found {found}")]
    BenchSize { expected: usize, found: usize },

    #[error("Expected exactly 1 bench GK, found {found}")]
    BenchGoalkeepers { found: usize },

    #[error("No starter other than the captain is available for vice-captain")]
    NoViceCandidate,

    #[error("Gameweek {gameweek}: indicator '{key}' must select exactly one player, found {found}")]
    IndicatorCount { gameweek: u8, key: String, found: usize },

    #[error("Malformed gameweek key '{key}', expected gw1..gw{max}")]
    MalformedGameweekKey { key: String, max: u8 },

    #[error("Malformed player key '{key}' in indicator map")]
    MalformedPlayerKey { key: String },

    #[error("Indicator value for player '{key}' must be 0 or 1, found {value}")]
    MalformedIndicator { key: String, value: String },
}

/// Structurally inconsistent transfer-state update.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    #[error("Transfer vectors differ in length: {bought} bought, {sold} sold")]
    MismatchedTransferCounts { bought: usize, sold: usize },

    #[error("Cannot sell player {player}: not owned")]
    SellingUnowned { player: PlayerId },

    #[error("Cannot buy player {player}: already owned")]
    BuyingOwned { player: PlayerId },

    #[error("Player {player} appears more than once in the transfer set")]
    DuplicateTransfer { player: PlayerId },

    #[error("No current cost for player {player}")]
    MissingCost { player: PlayerId },

    #[error("Owned player {player} has no recorded purchase price")]
    MissingPurchasePrice { player: PlayerId },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("State transition error: {0}")]
    StateTransition(#[from] StateTransitionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GW{gameweek} failed: {source}")]
    Gameweek {
        gameweek: u8,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub fn in_gameweek(self, gameweek: u8) -> Self {
        CoreError::Gameweek { gameweek, source: Box::new(self) }
    }

    /// Short category label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::DataIntegrity(_) => "data_integrity",
            CoreError::StateTransition(_) => "state_transition",
            CoreError::Config(_) => "config",
            CoreError::Json(_) => "json",
            CoreError::Gameweek { source, .. } => source.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_limit_lists_every_violation() {
        let err = ValidationError::ClubLimit {
            limit: 3,
            violations: vec![
                ClubCount { club: "ARS".to_string(), count: 4 },
                ClubCount { club: "LIV".to_string(), count: 5 },
            ],
        };
        assert_eq!(err.to_string(), "Maximum 3 players per club. Violations: ARS: 4, LIV: 5");
        assert_eq!(err.rule(), 3);
    }

    #[test]
    fn test_formation_message_is_prefixed() {
        let err = ValidationError::Formation(FormationError::OutOfBounds {
            position: Position::DEF,
            min: 3,
            max: 5,
            found: 2,
        });
        assert_eq!(err.to_string(), "Starting XI formation must have 3-5 DEF, found 2");
    }

    #[test]
    fn test_gameweek_wrapper_keeps_kind() {
        let err = CoreError::from(ValidationError::CaptainIsVice { player: PlayerId(7) })
            .in_gameweek(12);
        assert_eq!(err.kind(), "validation");
        assert!(err.to_string().starts_with("GW12 failed:"));
    }
}
