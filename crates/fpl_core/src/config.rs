//! # Rules Configuration
//!
//! Every rule constant of the game lives here so that validation, scoring and
//! transfer bookkeeping read from one place.
//!
//! ```rust
//! use fpl_core::config::RulesConfig;
//!
//! let rules = RulesConfig::default();
//! assert_eq!(rules.squad.size, 15);
//! ```
//!
//! A JSON override can be supplied through the `FPL_RULES_CONFIG_PATH`
//! environment variable; see [`load_rules_from_env`].

use crate::error::CoreError;
use crate::models::Position;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};

pub const RULES_CONFIG_PATH_ENV: &str = "FPL_RULES_CONFIG_PATH";

/// Inclusive count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Outfield bound that only applies once a lineup reaches `from_size` players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatedRange {
    pub range: CountRange,
    pub from_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadRules {
    /// Squad size (default: 15)
    pub size: usize,
    /// Exact position quotas (default: 2/5/5/3)
    pub goalkeepers: usize,
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
    /// Max players from one club (default: 3)
    pub max_per_club: usize,
}

impl Default for SquadRules {
    fn default() -> Self {
        Self {
            size: 15,
            goalkeepers: 2,
            defenders: 5,
            midfielders: 5,
            forwards: 3,
            max_per_club: 3,
        }
    }
}

impl SquadRules {
    pub fn quota(&self, position: Position) -> usize {
        match position {
            Position::GK => self.goalkeepers,
            Position::DEF => self.defenders,
            Position::MID => self.midfielders,
            Position::FWD => self.forwards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupRules {
    /// Starting XI size (default: 11)
    pub size: usize,
    /// Bench size (default: 4)
    pub bench_size: usize,
}

impl Default for LineupRules {
    fn default() -> Self {
        Self { size: 11, bench_size: 4 }
    }
}

/// Formation bounds.
///
/// Only the goalkeeper count is enforced unconditionally; outfield bounds are
/// gated on lineup size so partially filled lineups (during auto-subs) are
/// not rejected early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationRules {
    pub goalkeepers: usize,
    pub defenders: GatedRange,
    pub midfielders: GatedRange,
    pub forwards: GatedRange,
}

impl Default for FormationRules {
    fn default() -> Self {
        Self {
            goalkeepers: 1,
            defenders: GatedRange { range: CountRange::new(3, 5), from_size: 2 },
            midfielders: GatedRange { range: CountRange::new(2, 5), from_size: 4 },
            forwards: GatedRange { range: CountRange::new(1, 3), from_size: 5 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRules {
    /// Initial budget in tenths (default: 1000 = 100.0m)
    pub budget: i32,
    /// Free transfers available for GW2 (default: 2)
    pub initial_free_transfers: u32,
    /// Max banked free transfers (default: 2)
    pub max_free_transfers: u32,
    /// Points deducted per transfer beyond the free allowance (default: 4)
    pub hit_cost: i32,
}

impl Default for TransferRules {
    fn default() -> Self {
        Self { budget: 1000, initial_free_transfers: 2, max_free_transfers: 2, hit_cost: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRules {
    /// Number of gameweeks (default: 38)
    pub gameweeks: u8,
    /// Subtract transfer hits from gameweek points (default: false)
    #[serde(default)]
    pub deduct_transfer_hits: bool,
}

impl Default for SeasonRules {
    fn default() -> Self {
        Self { gameweeks: 38, deduct_transfer_hits: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub squad: SquadRules,
    #[serde(default)]
    pub lineup: LineupRules,
    #[serde(default)]
    pub formation: FormationRules,
    #[serde(default)]
    pub transfers: TransferRules,
    #[serde(default)]
    pub season: SeasonRules,
}

impl RulesConfig {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Same rules with transfer hits deducted from gameweek points.
    pub fn with_hits_deducted() -> Self {
        let mut cfg = Self::default();
        cfg.season.deduct_transfer_hits = true;
        cfg
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let squad = &self.squad;
        let quota_sum = squad.goalkeepers + squad.defenders + squad.midfielders + squad.forwards;
        if quota_sum != squad.size {
            return Err(CoreError::Config(format!(
                "squad quotas sum to {quota_sum}, squad size is {}",
                squad.size
            )));
        }
        if self.lineup.size + self.lineup.bench_size != squad.size {
            return Err(CoreError::Config(format!(
                "lineup ({}) + bench ({}) must equal squad size ({})",
                self.lineup.size, self.lineup.bench_size, squad.size
            )));
        }
        if squad.max_per_club == 0 {
            return Err(CoreError::Config("max_per_club must be positive".to_string()));
        }

        let f = &self.formation;
        for (name, gated) in
            [("defenders", f.defenders), ("midfielders", f.midfielders), ("forwards", f.forwards)]
        {
            if gated.range.min > gated.range.max {
                return Err(CoreError::Config(format!(
                    "formation {name}: min {} exceeds max {}",
                    gated.range.min, gated.range.max
                )));
            }
        }
        if f.goalkeepers > squad.goalkeepers {
            return Err(CoreError::Config(format!(
                "formation needs {} GK but squad only holds {}",
                f.goalkeepers, squad.goalkeepers
            )));
        }

        if self.transfers.max_free_transfers == 0 {
            return Err(CoreError::Config("max_free_transfers must be positive".to_string()));
        }
        if self.season.gameweeks == 0 {
            return Err(CoreError::Config("season must have at least one gameweek".to_string()));
        }
        Ok(())
    }
}

/// Load and validate rules from a JSON file.
pub fn load_rules_from_path(path: impl AsRef<Path>) -> Result<RulesConfig, CoreError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!("Failed to read rules config '{}': {e}", path.display()))
    })?;

    let config = RulesConfig::from_json(&content).map_err(|e| {
        CoreError::Config(format!("Failed to parse rules config '{}': {e}", path.display()))
    })?;

    config.validate()?;
    log::info!("loaded rules config from {}", path.display());
    Ok(config)
}

/// Load rules from the file named by `FPL_RULES_CONFIG_PATH`, falling back
/// to the defaults when the variable is unset or blank.
pub fn load_rules_from_env() -> Result<RulesConfig, CoreError> {
    let Ok(path) = env::var(RULES_CONFIG_PATH_ENV) else {
        return Ok(RulesConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(RulesConfig::default());
    }

    load_rules_from_path(path).map_err(|e| match e {
        CoreError::Config(msg) => CoreError::Config(format!("{RULES_CONFIG_PATH_ENV}: {msg}")),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_consistent() {
        let cfg = RulesConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.squad.quota(Position::DEF), 5);
        assert_eq!(cfg.formation.midfielders.from_size, 4);
        assert_eq!(cfg.formation.forwards.from_size, 5);
        assert!(!cfg.season.deduct_transfer_hits);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = RulesConfig::from_json(r#"{"season": {"gameweeks": 10}}"#).unwrap();
        assert_eq!(cfg.season.gameweeks, 10);
        assert_eq!(cfg.squad, SquadRules::default());
        assert_eq!(cfg.transfers.budget, 1000);
    }

    #[test]
    fn test_inconsistent_quotas_fail_validation() {
        let mut cfg = RulesConfig::default();
        cfg.squad.forwards = 4;
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_inverted_range_fails_validation() {
        let mut cfg = RulesConfig::default();
        cfg.formation.defenders.range = CountRange::new(5, 3);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{"season": {"gameweeks": 20, "deduct_transfer_hits": true}}"#).unwrap();

        let cfg = load_rules_from_path(&path).unwrap();
        assert_eq!(cfg.season.gameweeks, 20);
        assert!(cfg.season.deduct_transfer_hits);
        assert_eq!(cfg.transfers.hit_cost, 4);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_rules_from_path(&path), Err(CoreError::Config(_))));

        fs::write(&path, r#"{"lineup": {"size": 11, "bench_size": 3}}"#).unwrap();
        assert!(matches!(load_rules_from_path(&path), Err(CoreError::Config(_))));

        assert!(load_rules_from_path(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let cfg = RulesConfig::with_hits_deducted();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = RulesConfig::from_json(&json).unwrap();
        assert_eq!(parsed, cfg);
    }
}
