//! # fpl_core - Fantasy Squad Rule Engine
//!
//! Rule engine for season-long fantasy football squad management. Given
//! per-gameweek player data and a sequence of squad decisions it
//! validates, scores and carries transfer state through a season.
//!
//! ## Features
//! - Full roster legality (squad quotas, club cap, formation, bench, armband)
//! - Gameweek scoring with automatic substitutions and vice-captain fallback
//! - Vice-captain and bench order derivation from a primary decision
//! - Transfer bookkeeping with profit-locked selling prices
//! - Season backtests, several decision sources in parallel

// Rule APIs take the full selection as separate arguments
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod models;
pub mod roles;
pub mod rules;
pub mod scoring;
pub mod season;
pub mod transfers;

#[cfg(test)]
mod test_fixtures;

pub use config::{load_rules_from_env, load_rules_from_path, RulesConfig};
pub use error::{
    CoreError, DataIntegrityError, FormationError, Result, StateTransitionError, ValidationError,
};
pub use models::{
    BenchSlots, GameweekDecision, GameweekSnapshot, PlayerId, PlayerRecord, PlayerSnapshot,
    Position, SeasonData,
};
pub use roles::{RankingMetric, RoleAssigner, RoleAssignment};
pub use rules::{is_legal_formation, validate_team, FormationChecker, TeamValidator};
pub use scoring::{score_gameweek, ArmbandUsed, GameweekScore, GameweekScorer, ScoreBreakdown};
pub use season::{run_backtests, RunMode, SeasonDecisions, SeasonReport, SeasonRunner};
pub use transfers::{selling_price, TransferState, TransferStateTracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
