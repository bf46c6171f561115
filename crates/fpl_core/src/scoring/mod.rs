//! # Gameweek Scoring
//!
//! Realized points for one gameweek after automatic substitutions and the
//! captain/vice armband fallback.
//!
//! ## Algorithm
//!
//! 1. Starters with zero minutes drop out of the active set. If nobody
//!    played the gameweek scores zero.
//! 2. Bench slots are tried strictly in order 1, 2, 3, 4 until the active set
//!    is full. A bench player who did not play or is already active is
//!    skipped; one who did is committed only if the enlarged set passes the
//!    formation check.
//! 3. Base points are the sum over the final active set.
//! 4. The captain's points are added once more if they played, otherwise the
//!    vice's if they played, otherwise nothing.
//!
//! The bench order is taken as given and never re-sorted here.

use crate::config::{LineupRules, RulesConfig};
use crate::error::CoreError;
use crate::models::{BenchSlots, GameweekSnapshot, PlayerId, PlayerSnapshot, Position};
use crate::rules::{FormationChecker, PositionCounts};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Automatic substitution committed from the bench.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub slot: u8,
    pub player: PlayerId,
    pub name: String,
    pub position: Position,
    pub points: i32,
}

/// Which armband produced the bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmbandUsed {
    #[default]
    None,
    Captain,
    Vice,
}

impl fmt::Display for ArmbandUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmbandUsed::None => f.write_str("none"),
            ArmbandUsed::Captain => f.write_str("captain"),
            ArmbandUsed::Vice => f.write_str("vice"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Committed substitutions in commit order
    pub substitutions: Vec<Substitution>,
    pub captain_played: bool,
    pub vice_played: bool,
    pub armband_used: ArmbandUsed,
    pub armband_bonus: i32,
    pub base_points: i32,
    pub active_count: usize,
}

impl ScoreBreakdown {
    pub fn substituted(&self, player: PlayerId) -> bool {
        self.substitutions.iter().any(|s| s.player == player)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekScore {
    pub total_points: i32,
    /// Final active players: playing starters first, then substitutes in
    /// commit order.
    pub active: Vec<PlayerSnapshot>,
    pub breakdown: ScoreBreakdown,
}

impl GameweekScore {
    fn empty() -> Self {
        Self { total_points: 0, active: Vec::new(), breakdown: ScoreBreakdown::default() }
    }

    pub fn active_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.active.iter().map(|p| p.id)
    }

    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active.iter().any(|p| p.id == player)
    }

    pub fn formation_code(&self) -> String {
        PositionCounts::tally(&self.active).formation_code()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameweekScorer {
    lineup: LineupRules,
    formation: FormationChecker,
}

impl GameweekScorer {
    pub fn new(rules: &RulesConfig) -> Self {
        Self {
            lineup: rules.lineup.clone(),
            formation: FormationChecker::new(rules.formation.clone()),
        }
    }

    pub fn score(
        &self,
        snapshot: &GameweekSnapshot,
        starter_ids: &[PlayerId],
        bench: &BenchSlots,
        captain: PlayerId,
        vice: PlayerId,
    ) -> Result<GameweekScore, CoreError> {
        let starters = snapshot.resolve(starter_ids, "starting XI")?;
        let mut active: Vec<PlayerSnapshot> =
            starters.into_iter().filter(|p| p.played()).cloned().collect();

        if active.is_empty() {
            log::debug!("GW{}: no starter played, scoring zero", snapshot.gameweek());
            return Ok(GameweekScore::empty());
        }

        let mut counts = PositionCounts::tally(&active);
        let mut substitutions = Vec::new();

        for slot in 1..=self.lineup.bench_size as u8 {
            if active.len() >= self.lineup.size {
                break;
            }

            let candidate = snapshot.player(bench.slot(slot)?)?;
            if !candidate.played() {
                continue;
            }
            if active.iter().any(|p| p.id == candidate.id) {
                log::debug!(
                    "GW{}: bench {} ({}) already active, skipped",
                    snapshot.gameweek(),
                    slot,
                    candidate.name
                );
                continue;
            }

            let mut tentative = counts;
            tentative.add(candidate.position);
            if self.formation.check_counts(&tentative).is_err() {
                log::debug!(
                    "GW{}: bench {} ({}) would break formation {}, skipped",
                    snapshot.gameweek(),
                    slot,
                    candidate.name,
                    counts.formation_code()
                );
                continue;
            }

            counts = tentative;
            log::debug!(
                "GW{}: bench {} {} ({}) comes on for {} pts",
                snapshot.gameweek(),
                slot,
                candidate.name,
                candidate.position,
                candidate.points
            );
            substitutions.push(Substitution {
                slot,
                player: candidate.id,
                name: candidate.name.clone(),
                position: candidate.position,
                points: candidate.points,
            });
            active.push(candidate.clone());
        }

        let base_points: i32 = active.iter().map(|p| p.points).sum();

        let points_of = |id: PlayerId| active.iter().find(|p| p.id == id).map(|p| p.points);
        let captain_points = points_of(captain);
        let vice_points = points_of(vice);

        let (armband_used, armband_bonus) = match (captain_points, vice_points) {
            (Some(points), _) => (ArmbandUsed::Captain, points),
            (None, Some(points)) => (ArmbandUsed::Vice, points),
            (None, None) => (ArmbandUsed::None, 0),
        };

        let breakdown = ScoreBreakdown {
            substitutions,
            captain_played: captain_points.is_some(),
            vice_played: vice_points.is_some(),
            armband_used,
            armband_bonus,
            base_points,
            active_count: active.len(),
        };

        Ok(GameweekScore { total_points: base_points + armband_bonus, active, breakdown })
    }
}

/// Score a gameweek under the default rules.
pub fn score_gameweek(
    snapshot: &GameweekSnapshot,
    starter_ids: &[PlayerId],
    bench: &BenchSlots,
    captain: PlayerId,
    vice: PlayerId,
) -> Result<GameweekScore, CoreError> {
    GameweekScorer::default().score(snapshot, starter_ids, bench, captain, vice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataIntegrityError;
    use crate::rules::validate_team;
    use crate::test_fixtures::*;
    use proptest::prelude::*;

    fn score(fx: &TeamFixture) -> GameweekScore {
        let d = &fx.decision;
        score_gameweek(&fx.snapshot, &d.starters, &d.bench, d.captain, d.vice).unwrap()
    }

    const STARTERS: [u32; 11] = [1, 3, 4, 5, 6, 8, 9, 10, 11, 14, 15];

    #[test]
    fn test_full_attendance_end_to_end() {
        let fx = standard_team();
        let d = &fx.decision;
        validate_team(&fx.snapshot, &d.squad, &d.starters, &d.bench, d.captain, d.vice).unwrap();

        let result = score(&fx);
        // 9 starters x 2 + vice 5 + captain 8
        assert_eq!(result.breakdown.base_points, 31);
        assert_eq!(result.breakdown.armband_used, ArmbandUsed::Captain);
        assert_eq!(result.breakdown.armband_bonus, 8);
        assert_eq!(result.total_points, 31 + 8);
        assert!(result.breakdown.substitutions.is_empty());
        assert_eq!(result.formation_code(), "4-4-2");
    }

    #[test]
    fn test_nobody_played_scores_zero() {
        let mut fx = standard_team();
        fx.set_minutes(&STARTERS, 0);

        let result = score(&fx);
        assert_eq!(result.total_points, 0);
        assert!(result.active.is_empty());
        assert!(result.breakdown.substitutions.is_empty());
        assert_eq!(result.breakdown.armband_used, ArmbandUsed::None);
        assert!(!result.breakdown.captain_played);
    }

    #[test]
    fn test_vice_bonus_when_captain_absent() {
        let mut fx = standard_team();
        fx.set_minutes(&[14], 0);

        let result = score(&fx);
        assert!(!result.breakdown.captain_played);
        assert!(result.breakdown.vice_played);
        assert_eq!(result.breakdown.armband_used, ArmbandUsed::Vice);
        assert_eq!(result.breakdown.armband_bonus, 5);
        // DEF 7 is the first legal filler, giving 5-4-1
        assert_eq!(result.breakdown.substitutions.len(), 1);
        assert_eq!(result.breakdown.substitutions[0].slot, 2);
        assert_eq!(result.formation_code(), "5-4-1");
        assert_eq!(result.total_points, result.breakdown.base_points + 5);
    }

    #[test]
    fn test_no_bonus_when_both_armbands_absent() {
        let mut fx = standard_team();
        fx.set_minutes(&[14, 8], 0);
        fx.set_minutes(&[2, 7, 12, 13], 0);

        let result = score(&fx);
        assert_eq!(result.breakdown.armband_used, ArmbandUsed::None);
        assert_eq!(result.breakdown.armband_bonus, 0);
        assert_eq!(result.breakdown.active_count, 9);
        assert_eq!(result.total_points, 18);
    }

    #[test]
    fn test_zero_minute_bench_player_is_skipped() {
        let mut fx = standard_team();
        fx.set_minutes(&[9], 0);
        fx.set_minutes(&[7], 0);

        let result = score(&fx);
        let slots: Vec<u8> = result.breakdown.substitutions.iter().map(|s| s.slot).collect();
        // Slot 1 is the spare GK (formation rejects), slot 2 didn't play,
        // slot 3 fills the gap.
        assert_eq!(slots, vec![3]);
        assert!(!result.is_active(PlayerId(7)));
        assert!(result.is_active(PlayerId(12)));
        assert_eq!(result.breakdown.active_count, 11);
    }

    #[test]
    fn test_bench_stops_at_full_lineup() {
        let mut fx = standard_team();
        fx.set_minutes(&[3], 0);

        let result = score(&fx);
        assert_eq!(result.breakdown.substitutions.len(), 1);
        assert_eq!(result.breakdown.substitutions[0].player, PlayerId(7));
        assert!(!result.is_active(PlayerId(12)));
        assert!(!result.is_active(PlayerId(13)));
    }

    #[test]
    fn test_goalkeeper_substitution_from_slot_one() {
        let mut fx = standard_team();
        fx.set_minutes(&[1], 0);
        fx.set_points(2, 6);

        let result = score(&fx);
        let sub = &result.breakdown.substitutions[0];
        assert_eq!(
            (sub.slot, sub.player, sub.position, sub.points),
            (1, PlayerId(2), Position::GK, 6)
        );
        assert_eq!(sub.name, "Player 2");
    }

    #[test]
    fn test_formation_blocks_out_of_order_fill() {
        let mut fx = standard_team();
        // Two forwards out leaves 4-4-0. Neither DEF 7 nor MID 12 can come
        // on without a forward, so only the bench forward does.
        fx.set_minutes(&[14, 15], 0);

        let result = score(&fx);
        let slots: Vec<u8> = result.breakdown.substitutions.iter().map(|s| s.slot).collect();
        assert_eq!(slots, vec![4]);
        assert_eq!(result.breakdown.active_count, 10);
    }

    #[test]
    fn test_missing_bench_slot_is_integrity_error() {
        let mut fx = standard_team();
        fx.set_minutes(&[3], 0);
        fx.decision.bench = fx.decision.bench.iter().filter(|&(slot, _)| slot != 2).collect();

        let d = &fx.decision;
        let err =
            score_gameweek(&fx.snapshot, &d.starters, &d.bench, d.captain, d.vice).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DataIntegrity(DataIntegrityError::MissingBenchSlot { slot: 2 })
        ));
    }

    #[test]
    fn test_bench_starter_is_not_counted_twice() {
        let mut fx = standard_team();
        fx.set_minutes(&[3], 0);
        fx.decision.bench.insert(2, PlayerId(4));

        let result = score(&fx);
        assert_eq!(result.active_ids().filter(|&id| id == PlayerId(4)).count(), 1);
        let slots: Vec<u8> = result.breakdown.substitutions.iter().map(|s| s.slot).collect();
        assert_eq!(slots, vec![3]);
        assert_eq!(result.formation_code(), "3-5-2");
    }

    #[test]
    fn test_repeated_reserve_comes_on_once() {
        let mut fx = standard_team();
        fx.set_minutes(&[3, 4], 0);
        fx.decision.bench.insert(3, PlayerId(7));

        let result = score(&fx);
        let subs: Vec<PlayerId> = result.breakdown.substitutions.iter().map(|s| s.player).collect();
        assert_eq!(subs, ids(&[7, 13]));
        assert_eq!(result.breakdown.active_count, 11);
        assert_eq!(result.formation_code(), "3-4-3");
    }

    proptest! {
        #[test]
        fn test_substitutions_follow_slot_order(
            absent in proptest::collection::vec(any::<bool>(), 15)
        ) {
            let mut fx = standard_team();
            let out: Vec<u32> = (1..=15).filter(|&id| absent[(id - 1) as usize]).collect();
            fx.set_minutes(&out, 0);

            let result = score(&fx);
            let slots: Vec<u8> = result.breakdown.substitutions.iter().map(|s| s.slot).collect();
            prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(result.breakdown.active_count <= 11);
            for sub in &result.breakdown.substitutions {
                prop_assert!(!out.contains(&sub.player.0));
            }
            prop_assert_eq!(
                result.total_points,
                result.breakdown.base_points + result.breakdown.armband_bonus
            );
        }
    }
}
