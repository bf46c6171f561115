//! Season backtest driver.
//!
//! Walks gameweeks 1..=N in order. Each gameweek resolves the decision,
//! validates it, scores it and advances the transfer state. A
//! [`SeasonProgress`] value carries everything that crosses a gameweek
//! boundary; a failed gameweek leaves it untouched.

use super::decisions::{GameweekEntry, SeasonDecisions};
use super::report::{
    BenchLine, GameweekFailure, GameweekOutcome, GameweekReport, PlayerLine, SeasonReport,
    SeasonSummary,
};
use crate::config::RulesConfig;
use crate::error::{CoreError, DataIntegrityError};
use crate::models::{GameweekSnapshot, PlayerId, PlayerSnapshot, Position, SeasonData};
use crate::roles::{RankingMetric, RoleAssigner};
use crate::rules::TeamValidator;
use crate::scoring::GameweekScorer;
use crate::transfers::{detect_transfers, TransferState, TransferStateTracker};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do when a gameweek fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Abort the season at the first failing gameweek
    #[default]
    FailFast,
    /// Record the failure, skip the gameweek and carry on
    BestEffort,
}

/// State threaded from one gameweek to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonProgress {
    pub cumulative_points: i32,
    pub total_transfers: usize,
    pub total_hit_cost: i32,
    pub gameweeks_completed: usize,
    /// Transfer state after the last completed gameweek
    pub transfers: Option<TransferState>,
}

impl SeasonProgress {
    pub fn previous_squad(&self) -> Option<&[PlayerId]> {
        self.transfers.as_ref().map(TransferState::owned)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeasonRunner {
    rules: RulesConfig,
    mode: RunMode,
    validator: TeamValidator,
    scorer: GameweekScorer,
    assigner: RoleAssigner,
    tracker: TransferStateTracker,
}

impl SeasonRunner {
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            validator: TeamValidator::new(&rules),
            scorer: GameweekScorer::new(&rules),
            assigner: RoleAssigner::new(RankingMetric::default(), &rules),
            tracker: TransferStateTracker::new(&rules),
            mode: RunMode::default(),
            rules,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Metric used when a decision omits vice or bench roles.
    pub fn with_metric(mut self, metric: RankingMetric) -> Self {
        self.assigner = RoleAssigner::new(metric, &self.rules);
        self
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn run(
        &self,
        data: &SeasonData,
        decisions: &SeasonDecisions,
        label: &str,
    ) -> Result<SeasonReport, CoreError> {
        let season_length = self.rules.season.gameweeks;
        let mut progress = SeasonProgress::default();
        let mut gameweeks = Vec::with_capacity(usize::from(season_length));
        let mut failures = Vec::new();

        log::info!("[{label}] backtest over {season_length} gameweeks ({:?})", self.mode);

        for gw in 1..=season_length {
            let Some(entry) = decisions.get(gw) else {
                log::warn!("[{label}] gw{gw} not found in decisions, skipped");
                gameweeks.push(GameweekOutcome::Missing { gameweek: gw });
                continue;
            };

            match self.step(&progress, gw, data, entry) {
                Ok((next, report)) => {
                    log::info!(
                        "[{label}] GW{gw}: {} pts (cumulative {})",
                        report.points,
                        report.cumulative_points
                    );
                    progress = next;
                    gameweeks.push(GameweekOutcome::Completed(report));
                }
                Err(err) => match self.mode {
                    RunMode::FailFast => return Err(err.in_gameweek(gw)),
                    RunMode::BestEffort => {
                        log::warn!("[{label}] GW{gw} failed, skipped: {err}");
                        let failure = GameweekFailure::new(gw, &err);
                        failures.push(failure.clone());
                        gameweeks.push(GameweekOutcome::Failed(failure));
                    }
                },
            }
        }

        let summary = SeasonSummary {
            total_points: progress.cumulative_points,
            total_transfers: progress.total_transfers,
            total_hit_cost: progress.total_hit_cost,
            average_points: SeasonSummary::average(progress.cumulative_points, season_length),
            gameweeks_completed: progress.gameweeks_completed,
            season_length,
            failures,
        };

        log::info!(
            "[{label}] season total {} pts, {} transfers, avg {:.2}",
            summary.total_points,
            summary.total_transfers,
            summary.average_points
        );

        Ok(SeasonReport { label: label.to_string(), gameweeks, summary })
    }

    /// Process one gameweek against `progress`, returning the successor
    /// progress and the gameweek report.
    pub fn step(
        &self,
        progress: &SeasonProgress,
        gw: u8,
        data: &SeasonData,
        entry: &GameweekEntry,
    ) -> Result<(SeasonProgress, GameweekReport), CoreError> {
        let snapshot =
            data.gameweek(gw).ok_or(DataIntegrityError::MissingGameweekData { gameweek: gw })?;

        let decision = entry.decision(snapshot, &self.assigner)?;
        self.validator.validate_decision(snapshot, &decision)?;

        let score = self.scorer.score(
            snapshot,
            &decision.starters,
            &decision.bench,
            decision.captain,
            decision.vice,
        )?;

        for &id in &decision.starters {
            let player = snapshot.player(id)?;
            if !player.available {
                log::warn!("GW{gw}: starter {} ({}) flagged unavailable", player.name, id);
            }
        }

        let (transfers_in, transfers_out, hit_cost, state) = match &progress.transfers {
            None => {
                let state = self.tracker.initial_state(&decision.squad, snapshot)?;
                (Vec::new(), Vec::new(), 0, state)
            }
            Some(previous) => {
                let (bought, sold) = detect_transfers(previous.owned(), &decision.squad);
                let hit = self.tracker.transfer_hit_points(bought.len(), previous.free_transfers());
                let state = self.tracker.advance(previous, &bought, &sold, &snapshot.costs())?;
                (bought, sold, hit, state)
            }
        };

        let points = if self.rules.season.deduct_transfer_hits {
            score.total_points - hit_cost
        } else {
            score.total_points
        };

        let next = SeasonProgress {
            cumulative_points: progress.cumulative_points + points,
            total_transfers: progress.total_transfers + transfers_in.len(),
            total_hit_cost: progress.total_hit_cost + hit_cost,
            gameweeks_completed: progress.gameweeks_completed + 1,
            transfers: Some(state),
        };

        let report = GameweekReport {
            gameweek: gw,
            points,
            cumulative_points: next.cumulative_points,
            transfers_in: player_lines(snapshot, &transfers_in)?,
            transfers_out: player_lines(snapshot, &transfers_out)?,
            hit_cost,
            bank: next.transfers.as_ref().map_or(0, TransferState::bank),
            free_transfers: next.transfers.as_ref().map_or(0, TransferState::free_transfers),
            captain: snapshot.player(decision.captain)?.into(),
            vice: snapshot.player(decision.vice)?.into(),
            armband_used: score.breakdown.armband_used,
            armband_bonus: score.breakdown.armband_bonus,
            lineup: lineup_lines(&score.active),
            bench: decision
                .bench
                .iter()
                .map(|(slot, id)| {
                    Ok::<_, DataIntegrityError>(BenchLine {
                        slot,
                        player: snapshot.player(id)?.into(),
                        came_on: score.breakdown.substituted(id),
                    })
                })
                .collect::<Result<_, DataIntegrityError>>()?,
            substitutions: score.breakdown.substitutions,
        };

        Ok((next, report))
    }
}

fn player_lines(
    snapshot: &GameweekSnapshot,
    ids: &[PlayerId],
) -> Result<Vec<PlayerLine>, DataIntegrityError> {
    ids.iter().map(|&id| snapshot.player(id).map(PlayerLine::from)).collect()
}

fn lineup_lines(active: &[PlayerSnapshot]) -> Vec<PlayerLine> {
    let mut lines: Vec<PlayerLine> = active.iter().map(PlayerLine::from).collect();
    lines.sort_by(|a, b| {
        position_rank(a.position)
            .cmp(&position_rank(b.position))
            .then_with(|| a.name.cmp(&b.name))
    });
    lines
}

fn position_rank(position: Position) -> usize {
    Position::ALL.iter().position(|&p| p == position).unwrap_or(Position::ALL.len())
}

/// Run several decision sources over the same season in parallel.
///
/// Results come back in input order; each season is independent.
pub fn run_backtests(
    runner: &SeasonRunner,
    data: &SeasonData,
    sources: &[(String, SeasonDecisions)],
) -> Vec<Result<SeasonReport, CoreError>> {
    sources
        .par_iter()
        .map(|(label, decisions)| runner.run(data, decisions, label))
        .collect()
}
