//! Formation legality for full and partially built lineups.
//!
//! Check order is fixed: GK count, then DEF, MID and FWD bounds, each outfield
//! bound applying only once the lineup reaches its gate size. Auto-substitution
//! relies on this gating to add bench players one at a time.

use crate::config::FormationRules;
use crate::error::FormationError;
use crate::models::{PlayerSnapshot, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCounts {
    pub gk: usize,
    pub def: usize,
    pub mid: usize,
    pub fwd: usize,
}

impl PositionCounts {
    pub fn from_positions(positions: impl IntoIterator<Item = Position>) -> Self {
        let mut counts = Self::default();
        for position in positions {
            counts.add(position);
        }
        counts
    }

    pub fn tally<'a>(players: impl IntoIterator<Item = &'a PlayerSnapshot>) -> Self {
        Self::from_positions(players.into_iter().map(|p| p.position))
    }

    pub fn add(&mut self, position: Position) {
        match position {
            Position::GK => self.gk += 1,
            Position::DEF => self.def += 1,
            Position::MID => self.mid += 1,
            Position::FWD => self.fwd += 1,
        }
    }

    pub fn get(&self, position: Position) -> usize {
        match position {
            Position::GK => self.gk,
            Position::DEF => self.def,
            Position::MID => self.mid,
            Position::FWD => self.fwd,
        }
    }

    pub fn total(&self) -> usize {
        self.gk + self.def + self.mid + self.fwd
    }

    /// Outfield shape, e.g. "4-4-2".
    pub fn formation_code(&self) -> String {
        format!("{}-{}-{}", self.def, self.mid, self.fwd)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormationChecker {
    rules: FormationRules,
}

impl FormationChecker {
    pub fn new(rules: FormationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FormationRules {
        &self.rules
    }

    pub fn check_counts(&self, counts: &PositionCounts) -> Result<(), FormationError> {
        let total = counts.total();

        if counts.gk != self.rules.goalkeepers {
            return Err(FormationError::GoalkeeperCount {
                expected: self.rules.goalkeepers,
                found: counts.gk,
            });
        }

        let outfield = [
            (Position::DEF, self.rules.defenders),
            (Position::MID, self.rules.midfielders),
            (Position::FWD, self.rules.forwards),
        ];
        for (position, gated) in outfield {
            let found = counts.get(position);
            if total >= gated.from_size && !gated.range.contains(found) {
                return Err(FormationError::OutOfBounds {
                    position,
                    min: gated.range.min,
                    max: gated.range.max,
                    found,
                });
            }
        }

        Ok(())
    }

    pub fn check<'a>(
        &self,
        players: impl IntoIterator<Item = &'a PlayerSnapshot>,
    ) -> Result<(), FormationError> {
        self.check_counts(&PositionCounts::tally(players))
    }
}

/// Check a set of players against the default formation rules.
pub fn is_legal_formation<'a>(
    players: impl IntoIterator<Item = &'a PlayerSnapshot>,
) -> Result<(), FormationError> {
    FormationChecker::default().check(players)
}
