//! Secondary role assignment.
//!
//! An optimizer decides squad, starters and captain. The vice-captain and the
//! bench order follow from those choices and a ranking metric:
//!
//! - vice: best-ranked starter other than the captain, lowest id on ties
//! - bench slot 1: the single goalkeeper left out of the XI
//! - bench slots 2..: remaining outfield reserves, best first, ties kept in
//!   squad order

use crate::config::{LineupRules, RulesConfig};
use crate::error::DataIntegrityError;
use crate::models::{BenchSlots, GameweekDecision, GameweekSnapshot, PlayerId, PlayerSnapshot};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Value used to rank players when deriving roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    /// Forecast points (normal mode)
    #[default]
    ExpectedPoints,
    /// Realized points (oracle mode)
    Points,
}

impl RankingMetric {
    pub fn value(&self, player: &PlayerSnapshot) -> f64 {
        match self {
            RankingMetric::ExpectedPoints => player.expected_points,
            RankingMetric::Points => f64::from(player.points),
        }
    }

    fn compare(&self, a: &PlayerSnapshot, b: &PlayerSnapshot) -> Ordering {
        self.value(a).total_cmp(&self.value(b))
    }
}

/// Derived vice-captain and bench order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub vice: PlayerId,
    pub bench: BenchSlots,
}

impl RoleAssignment {
    /// Combine with the primary decision into a full gameweek selection.
    pub fn complete(
        self,
        squad: Vec<PlayerId>,
        starters: Vec<PlayerId>,
        captain: PlayerId,
    ) -> GameweekDecision {
        GameweekDecision { squad, starters, captain, vice: self.vice, bench: self.bench }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleAssigner {
    metric: RankingMetric,
    lineup: LineupRules,
}

impl RoleAssigner {
    pub fn new(metric: RankingMetric, rules: &RulesConfig) -> Self {
        Self { metric, lineup: rules.lineup.clone() }
    }

    pub fn with_metric(metric: RankingMetric) -> Self {
        Self { metric, ..Self::default() }
    }

    pub fn metric(&self) -> RankingMetric {
        self.metric
    }

    pub fn assign_vice(
        &self,
        snapshot: &GameweekSnapshot,
        starters: &[PlayerId],
        captain: PlayerId,
    ) -> Result<PlayerId, DataIntegrityError> {
        let candidates = snapshot.resolve(starters, "starting XI")?;
        candidates
            .into_iter()
            .filter(|p| p.id != captain)
            .max_by(|a, b| self.metric.compare(a, b).then_with(|| b.id.cmp(&a.id)))
            .map(|p| p.id)
            .ok_or(DataIntegrityError::NoViceCandidate)
    }

    pub fn assign_bench(
        &self,
        snapshot: &GameweekSnapshot,
        squad: &[PlayerId],
        starters: &[PlayerId],
    ) -> Result<BenchSlots, DataIntegrityError> {
        let reserve_ids: Vec<PlayerId> =
            squad.iter().copied().filter(|id| !starters.contains(id)).collect();
        if reserve_ids.len() != self.lineup.bench_size {
            return Err(DataIntegrityError::BenchSize {
                expected: self.lineup.bench_size,
                found: reserve_ids.len(),
            });
        }

        let reserves = snapshot.resolve(&reserve_ids, "bench")?;
        let (goalkeepers, mut outfield): (Vec<&PlayerSnapshot>, Vec<&PlayerSnapshot>) =
            reserves.into_iter().partition(|p| p.position.is_goalkeeper());

        let [goalkeeper] = goalkeepers.as_slice() else {
            return Err(DataIntegrityError::BenchGoalkeepers { found: goalkeepers.len() });
        };

        // Stable sort keeps squad order between equal values
        outfield.sort_by(|a, b| self.metric.compare(b, a));

        Ok((1u8..)
            .zip(std::iter::once(*goalkeeper).chain(outfield).map(|p| p.id))
            .collect())
    }

    pub fn assign(
        &self,
        snapshot: &GameweekSnapshot,
        squad: &[PlayerId],
        starters: &[PlayerId],
        captain: PlayerId,
    ) -> Result<RoleAssignment, DataIntegrityError> {
        let vice = self.assign_vice(snapshot, starters, captain)?;
        let bench = self.assign_bench(snapshot, squad, starters)?;
        log::debug!(
            "GW{}: vice {} bench {:?}",
            snapshot.gameweek(),
            vice,
            bench.players().collect::<Vec<_>>()
        );
        Ok(RoleAssignment { vice, bench })
    }

    /// Derive roles and build the full selection in one step.
    pub fn complete(
        &self,
        snapshot: &GameweekSnapshot,
        squad: Vec<PlayerId>,
        starters: Vec<PlayerId>,
        captain: PlayerId,
    ) -> Result<GameweekDecision, DataIntegrityError> {
        let roles = self.assign(snapshot, &squad, &starters, captain)?;
        Ok(roles.complete(squad, starters, captain))
    }
}
