//! Full-team legality for one gameweek.
//!
//! Checks run in a fixed order and stop at the first failure; errors are never
//! aggregated. Ids that cannot be resolved against the gameweek data surface
//! as [`DataIntegrityError`] at the step that first needs them, as does a
//! bench that repeats a player or names one outside the reserves.

use super::formation::{FormationChecker, PositionCounts};
use crate::config::{LineupRules, RulesConfig, SquadRules};
use crate::error::{ClubCount, CoreError, DataIntegrityError, ValidationError};
use crate::models::{BenchSlots, GameweekDecision, GameweekSnapshot, PlayerId, Position};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TeamValidator {
    squad: SquadRules,
    lineup: LineupRules,
    formation: FormationChecker,
}

impl TeamValidator {
    pub fn new(rules: &RulesConfig) -> Self {
        Self {
            squad: rules.squad.clone(),
            lineup: rules.lineup.clone(),
            formation: FormationChecker::new(rules.formation.clone()),
        }
    }

    pub fn validate(
        &self,
        snapshot: &GameweekSnapshot,
        squad_ids: &[PlayerId],
        starter_ids: &[PlayerId],
        bench: &BenchSlots,
        captain: PlayerId,
        vice: PlayerId,
    ) -> Result<(), CoreError> {
        // 1. Squad size
        if squad_ids.len() != self.squad.size {
            return Err(ValidationError::SquadSize {
                expected: self.squad.size,
                found: squad_ids.len(),
            }
            .into());
        }

        // 2. Squad composition
        let squad = snapshot.resolve(squad_ids, "squad")?;
        let counts = PositionCounts::tally(squad.iter().copied());
        for position in Position::ALL {
            let expected = self.squad.quota(position);
            let found = counts.get(position);
            if found != expected {
                return Err(ValidationError::SquadComposition { position, expected, found }.into());
            }
        }

        // 3. Club limit
        let mut per_club: BTreeMap<&str, usize> = BTreeMap::new();
        for player in &squad {
            *per_club.entry(player.club.as_str()).or_default() += 1;
        }
        let violations: Vec<ClubCount> = per_club
            .into_iter()
            .filter(|&(_, count)| count > self.squad.max_per_club)
            .map(|(club, count)| ClubCount { club: club.to_string(), count })
            .collect();
        if !violations.is_empty() {
            return Err(ValidationError::ClubLimit { limit: self.squad.max_per_club, violations }
                .into());
        }

        // 4. Starting XI size
        if starter_ids.len() != self.lineup.size {
            return Err(ValidationError::StartingSize {
                expected: self.lineup.size,
                found: starter_ids.len(),
            }
            .into());
        }

        // 5. Starting XI formation
        let starters = snapshot.resolve(starter_ids, "starting XI")?;
        self.formation.check(starters.iter().copied()).map_err(ValidationError::Formation)?;

        // 6. Bench slots
        let expected_slots: Vec<u8> = (1..=self.lineup.bench_size as u8).collect();
        let found_slots = bench.slot_numbers();
        if found_slots != expected_slots {
            return Err(ValidationError::BenchSlots { found: found_slots }.into());
        }

        // 7. Slot 1 is the substitute goalkeeper
        let first = snapshot.player(bench.slot(1)?)?;
        if !first.position.is_goalkeeper() {
            return Err(
                ValidationError::BenchGoalkeeper { player: first.id, found: first.position }.into()
            );
        }

        // 8. Remaining slots are outfield
        for &slot in &expected_slots[1..] {
            let player = snapshot.player(bench.slot(slot)?)?;
            if player.position.is_goalkeeper() {
                return Err(ValidationError::BenchOutfield { slot, player: player.id }.into());
            }
        }

        // Reserves are distinct squad players outside the XI
        let bench_ids: Vec<PlayerId> = bench.players().collect();
        for reserve in snapshot.resolve(&bench_ids, "bench")? {
            if starter_ids.contains(&reserve.id) {
                return Err(DataIntegrityError::BenchPlayerStarting { player: reserve.id }.into());
            }
            if !squad_ids.contains(&reserve.id) {
                return Err(DataIntegrityError::BenchPlayerNotInSquad { player: reserve.id }.into());
            }
        }

        // 9-11. Captaincy
        if captain == vice {
            return Err(ValidationError::CaptainIsVice { player: captain }.into());
        }
        if !starter_ids.contains(&captain) {
            return Err(ValidationError::CaptainNotStarting { captain }.into());
        }
        if !starter_ids.contains(&vice) {
            return Err(ValidationError::ViceNotStarting { vice }.into());
        }

        Ok(())
    }

    pub fn validate_decision(
        &self,
        snapshot: &GameweekSnapshot,
        decision: &GameweekDecision,
    ) -> Result<(), CoreError> {
        self.validate(
            snapshot,
            &decision.squad,
            &decision.starters,
            &decision.bench,
            decision.captain,
            decision.vice,
        )
    }
}

/// Validate a team against the default rules.
pub fn validate_team(
    snapshot: &GameweekSnapshot,
    squad_ids: &[PlayerId],
    starter_ids: &[PlayerId],
    bench: &BenchSlots,
    captain: PlayerId,
    vice: PlayerId,
) -> Result<(), CoreError> {
    TeamValidator::default().validate(snapshot, squad_ids, starter_ids, bench, captain, vice)
}
