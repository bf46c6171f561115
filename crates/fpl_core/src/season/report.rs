//! Backtest reports.
//!
//! Everything here is plain data: serializable with serde and rendered as a
//! text report through `Display`.

use crate::error::CoreError;
use crate::models::{PlayerId, PlayerSnapshot, Position};
use crate::scoring::{ArmbandUsed, Substitution};
use serde::{Deserialize, Serialize};
use std::fmt;

const RULE: &str =
    "================================================================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub club: String,
    pub points: i32,
    pub minutes: u32,
}

impl From<&PlayerSnapshot> for PlayerLine {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            position: p.position,
            club: p.club.clone(),
            points: p.points,
            minutes: p.minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchLine {
    pub slot: u8,
    pub player: PlayerLine,
    pub came_on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekReport {
    pub gameweek: u8,
    /// Points counted for the season (after any hit deduction)
    pub points: i32,
    pub cumulative_points: i32,
    pub transfers_in: Vec<PlayerLine>,
    pub transfers_out: Vec<PlayerLine>,
    pub hit_cost: i32,
    pub bank: i32,
    pub free_transfers: u32,
    pub captain: PlayerLine,
    pub vice: PlayerLine,
    pub armband_used: ArmbandUsed,
    pub armband_bonus: i32,
    pub substitutions: Vec<Substitution>,
    /// Active players grouped GK, DEF, MID, FWD, then by name
    pub lineup: Vec<PlayerLine>,
    pub bench: Vec<BenchLine>,
}

impl GameweekReport {
    pub fn transfers_made(&self) -> usize {
        self.transfers_in.len()
    }
}

fn tenths(value: i32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}.{}m", value.abs() / 10, value.abs() % 10)
}

fn write_transfers(f: &mut fmt::Formatter<'_>, label: &str, lines: &[PlayerLine]) -> fmt::Result {
    writeln!(f, "  {label} ({}):", lines.len())?;
    for p in lines {
        writeln!(f, "    {} (ID: {}, {}, {})", p.name, p.id, p.position, p.club)?;
    }
    Ok(())
}

impl fmt::Display for GameweekReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "GAMEWEEK {}", self.gameweek)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Points: {}", self.points)?;
        writeln!(f, "Cumulative Points: {}", self.cumulative_points)?;

        if self.transfers_in.is_empty() {
            writeln!(f, "\nTransfers: None")?;
        } else {
            writeln!(f, "\nTransfers:")?;
            write_transfers(f, "IN", &self.transfers_in)?;
            write_transfers(f, "OUT", &self.transfers_out)?;
        }
        if self.hit_cost > 0 {
            writeln!(f, "Transfer Hit: -{} pts", self.hit_cost)?;
        }
        writeln!(f, "Bank: {} | Free Transfers: {}", tenths(self.bank), self.free_transfers)?;

        writeln!(f, "\nCaptain: {} (ID: {})", self.captain.name, self.captain.id)?;
        writeln!(f, "Vice-Captain: {} (ID: {})", self.vice.name, self.vice.id)?;
        if self.armband_used != ArmbandUsed::None {
            writeln!(f, "Captain Bonus: +{} pts ({})", self.armband_bonus, self.armband_used)?;
        }

        if self.substitutions.is_empty() {
            writeln!(f, "\nSubstitutions Made: None")?;
        } else {
            writeln!(f, "\nSubstitutions Made ({}):", self.substitutions.len())?;
            for sub in &self.substitutions {
                writeln!(
                    f,
                    "  Bench {}: {} ({}) - {}pts",
                    sub.slot, sub.name, sub.position, sub.points
                )?;
            }
        }

        writeln!(f, "\nActive Lineup ({} players):", self.lineup.len())?;
        for p in &self.lineup {
            let marker = if p.id == self.captain.id {
                " (C)"
            } else if p.id == self.vice.id {
                " (VC)"
            } else {
                ""
            };
            writeln!(
                f,
                "  {}: {}{} - {}pts ({}min)",
                p.position, p.name, marker, p.points, p.minutes
            )?;
        }

        writeln!(f, "\nBench:")?;
        for line in &self.bench {
            let p = &line.player;
            writeln!(
                f,
                "  {}. {} ({}) - {}pts ({}min) [{}]",
                line.slot,
                p.name,
                p.position,
                p.points,
                p.minutes,
                if line.came_on { "✓" } else { "✗" }
            )?;
        }
        Ok(())
    }
}

/// A gameweek that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekFailure {
    pub gameweek: u8,
    /// Error category, see [`CoreError::kind`]
    pub kind: String,
    pub message: String,
}

impl GameweekFailure {
    pub fn new(gameweek: u8, error: &CoreError) -> Self {
        Self { gameweek, kind: error.kind().to_string(), message: error.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameweekOutcome {
    Completed(GameweekReport),
    /// No decision for this gameweek
    Missing { gameweek: u8 },
    Failed(GameweekFailure),
}

impl GameweekOutcome {
    pub fn gameweek(&self) -> u8 {
        match self {
            GameweekOutcome::Completed(report) => report.gameweek,
            GameweekOutcome::Missing { gameweek } => *gameweek,
            GameweekOutcome::Failed(failure) => failure.gameweek,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub total_points: i32,
    pub total_transfers: usize,
    pub total_hit_cost: i32,
    pub average_points: f64,
    pub gameweeks_completed: usize,
    pub season_length: u8,
    pub failures: Vec<GameweekFailure>,
}

impl SeasonSummary {
    /// Average over the full season length; zero for a non-positive total.
    pub fn average(total_points: i32, season_length: u8) -> f64 {
        if total_points > 0 && season_length > 0 {
            f64::from(total_points) / f64::from(season_length)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    /// Name of the decision source
    pub label: String,
    pub gameweeks: Vec<GameweekOutcome>,
    pub summary: SeasonSummary,
}

impl SeasonReport {
    pub fn completed(&self) -> impl Iterator<Item = &GameweekReport> {
        self.gameweeks.iter().filter_map(|outcome| match outcome {
            GameweekOutcome::Completed(report) => Some(report),
            _ => None,
        })
    }

    pub fn gameweek(&self, gameweek: u8) -> Option<&GameweekOutcome> {
        self.gameweeks.iter().find(|outcome| outcome.gameweek() == gameweek)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SeasonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "FPL BACKTESTER RESULTS")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Decisions: {}", self.label)?;
        writeln!(f, "{RULE}")?;

        for outcome in &self.gameweeks {
            writeln!(f)?;
            match outcome {
                GameweekOutcome::Completed(report) => write!(f, "{report}")?,
                GameweekOutcome::Missing { gameweek } => {
                    writeln!(f, "WARNING: gw{gameweek} not found in decisions")?
                }
                GameweekOutcome::Failed(failure) => {
                    writeln!(f, "ERROR in GW{}: {}", failure.gameweek, failure.message)?
                }
            }
        }

        let s = &self.summary;
        writeln!(f, "\n\n{RULE}")?;
        writeln!(f, "FINAL SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total Points: {}", s.total_points)?;
        writeln!(f, "Total Transfers: {}", s.total_transfers)?;
        if s.total_hit_cost > 0 {
            writeln!(f, "Total Transfer Hits: -{} pts", s.total_hit_cost)?;
        }
        writeln!(f, "Average GW Points: {:.2}", s.average_points)?;
        writeln!(f, "Gameweeks Completed: {}", s.gameweeks_completed)?;
        if !s.failures.is_empty() {
            writeln!(f, "Gameweeks Failed: {}", s.failures.len())?;
        }
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::player;

    fn line(id: u32, position: Position, points: i32) -> PlayerLine {
        PlayerLine::from(&player(id, position, "ARS", points, 90))
    }

    fn sample_report() -> GameweekReport {
        GameweekReport {
            gameweek: 4,
            points: 61,
            cumulative_points: 200,
            transfers_in: vec![line(20, Position::MID, 7)],
            transfers_out: vec![line(9, Position::MID, 1)],
            hit_cost: 0,
            bank: 15,
            free_transfers: 1,
            captain: line(14, Position::FWD, 8),
            vice: line(8, Position::MID, 5),
            armband_used: ArmbandUsed::Captain,
            armband_bonus: 8,
            substitutions: vec![Substitution {
                slot: 2,
                player: PlayerId(7),
                name: "Player 7".to_string(),
                position: Position::DEF,
                points: 3,
            }],
            lineup: vec![line(1, Position::GK, 2), line(14, Position::FWD, 8)],
            bench: vec![
                BenchLine { slot: 1, player: line(2, Position::GK, 0), came_on: false },
                BenchLine { slot: 2, player: line(7, Position::DEF, 3), came_on: true },
            ],
        }
    }

    #[test]
    fn test_average_over_season_length() {
        assert!((SeasonSummary::average(1900, 38) - 50.0).abs() < 1e-9);
        assert_eq!(SeasonSummary::average(0, 38), 0.0);
        assert_eq!(SeasonSummary::average(-8, 38), 0.0);
    }

    #[test]
    fn test_gameweek_text_layout() {
        let text = sample_report().to_string();
        assert!(text.contains("GAMEWEEK 4"));
        assert!(text.contains("  IN (1):\n    Player 20 (ID: 20, MID, ARS)"));
        assert!(text.contains("Bank: 1.5m | Free Transfers: 1"));
        assert!(text.contains("Captain Bonus: +8 pts (captain)"));
        assert!(text.contains("  Bench 2: Player 7 (DEF) - 3pts"));
        assert!(text.contains("  FWD: Player 14 (C) - 8pts (90min)"));
        assert!(text.contains("  2. Player 7 (DEF) - 3pts (90min) [✓]"));
        assert!(text.contains("  1. Player 2 (GK) - 0pts (90min) [✗]"));
        assert!(!text.contains("Transfer Hit"));
    }

    #[test]
    fn test_season_text_and_json() {
        let report = SeasonReport {
            label: "milp_cbc".to_string(),
            gameweeks: vec![
                GameweekOutcome::Completed(sample_report()),
                GameweekOutcome::Missing { gameweek: 5 },
            ],
            summary: SeasonSummary {
                total_points: 200,
                total_transfers: 1,
                total_hit_cost: 0,
                average_points: SeasonSummary::average(200, 38),
                gameweeks_completed: 1,
                season_length: 38,
                failures: Vec::new(),
            },
        };

        let text = report.to_string();
        assert!(text.contains("Decisions: milp_cbc"));
        assert!(text.contains("WARNING: gw5 not found in decisions"));
        assert!(text.contains("Average GW Points: 5.26"));

        let json = report.to_json().unwrap();
        let parsed: SeasonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.gameweeks, report.gameweeks);
        assert!(json.contains("\"status\": \"missing\""));
    }

    #[test]
    fn test_summary_only_report_snapshot() {
        let report = SeasonReport {
            label: "steady".to_string(),
            gameweeks: Vec::new(),
            summary: SeasonSummary {
                total_points: 380,
                total_transfers: 12,
                total_hit_cost: 0,
                average_points: SeasonSummary::average(380, 38),
                gameweeks_completed: 38,
                season_length: 38,
                failures: Vec::new(),
            },
        };

        insta::assert_snapshot!(report.to_string(), @r"
================================================================================
FPL BACKTESTER RESULTS
================================================================================
Decisions: steady
================================================================================


================================================================================
FINAL SUMMARY
================================================================================
Total Points: 380
Total Transfers: 12
Average GW Points: 10.00
Gameweeks Completed: 38
================================================================================
");
    }

    #[test]
    fn test_negative_bank_renders_sign() {
        assert_eq!(tenths(-5), "-0.5m");
        assert_eq!(tenths(1000), "100.0m");
    }
}
