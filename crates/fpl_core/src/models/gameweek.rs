//! Per-gameweek player tables.
//!
//! A [`GameweekSnapshot`] is validated once on construction (no duplicate
//! ids) and is immutable afterwards, so it can be shared freely between
//! threads running independent backtests.

use super::player::{PlayerId, PlayerSnapshot, Position};
use crate::error::{CoreError, DataIntegrityError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct GameweekSnapshot {
    gameweek: u8,
    players: HashMap<PlayerId, PlayerSnapshot>,
}

impl GameweekSnapshot {
    pub fn new(
        gameweek: u8,
        players: impl IntoIterator<Item = PlayerSnapshot>,
    ) -> Result<Self, DataIntegrityError> {
        let mut by_id = HashMap::new();
        for player in players {
            let id = player.id;
            if by_id.insert(id, player).is_some() {
                return Err(DataIntegrityError::DuplicatePlayer {
                    player: id,
                    context: "gameweek data",
                });
            }
        }
        Ok(Self { gameweek, players: by_id })
    }

    pub fn gameweek(&self) -> u8 {
        self.gameweek
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.get(&id)
    }

    pub fn player(&self, id: PlayerId) -> Result<&PlayerSnapshot, DataIntegrityError> {
        self.players
            .get(&id)
            .ok_or(DataIntegrityError::UnknownPlayer { player: id, gameweek: self.gameweek })
    }

    /// Resolve a list of ids, rejecting unknown and repeated ids.
    pub fn resolve(
        &self,
        ids: &[PlayerId],
        context: &'static str,
    ) -> Result<Vec<&PlayerSnapshot>, DataIntegrityError> {
        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter()
            .map(|&id| {
                if !seen.insert(id) {
                    return Err(DataIntegrityError::DuplicatePlayer { player: id, context });
                }
                self.player(id)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.players.values()
    }

    /// Current cost of every player in this gameweek.
    pub fn costs(&self) -> HashMap<PlayerId, i32> {
        self.players.iter().map(|(&id, p)| (id, p.cost)).collect()
    }

    /// Copy with `expected_points` replaced by realized points.
    pub fn into_oracle(self) -> Self {
        let players = self
            .players
            .into_iter()
            .map(|(id, mut p)| {
                p.expected_points = f64::from(p.points);
                (id, p)
            })
            .collect();
        Self { gameweek: self.gameweek, players }
    }
}

/// One row of the cleaned per-gameweek player table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: u32,
    pub gw: u8,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub cost: i32,
    pub points: i32,
    pub minutes: u32,
    #[serde(rename = "eP", default)]
    pub expected_points: f64,
    #[serde(default)]
    pub unavailable: u8,
}

impl From<PlayerRecord> for PlayerSnapshot {
    fn from(record: PlayerRecord) -> Self {
        PlayerSnapshot {
            id: PlayerId(record.player_id),
            name: record.name,
            position: record.position,
            club: record.team,
            cost: record.cost,
            points: record.points,
            minutes: record.minutes,
            available: record.unavailable == 0,
            expected_points: record.expected_points,
        }
    }
}

/// All gameweeks of a season, keyed by gameweek number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonData {
    gameweeks: BTreeMap<u8, GameweekSnapshot>,
}

impl SeasonData {
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = GameweekSnapshot>) -> Self {
        Self { gameweeks: snapshots.into_iter().map(|s| (s.gameweek(), s)).collect() }
    }

    pub fn from_records(
        records: impl IntoIterator<Item = PlayerRecord>,
    ) -> Result<Self, DataIntegrityError> {
        let mut grouped: BTreeMap<u8, Vec<PlayerSnapshot>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.gw).or_default().push(record.into());
        }

        let gameweeks = grouped
            .into_iter()
            .map(|(gw, players)| GameweekSnapshot::new(gw, players).map(|s| (gw, s)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self { gameweeks })
    }

    /// Parse a JSON array of [`PlayerRecord`] rows.
    pub fn from_json_records(json: &str) -> Result<Self, CoreError> {
        let records: Vec<PlayerRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records)?)
    }

    pub fn gameweek(&self, gw: u8) -> Option<&GameweekSnapshot> {
        self.gameweeks.get(&gw)
    }

    pub fn gameweek_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.gameweeks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.gameweeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gameweeks.is_empty()
    }

    pub fn into_oracle(self) -> Self {
        Self {
            gameweeks: self.gameweeks.into_iter().map(|(gw, s)| (gw, s.into_oracle())).collect(),
        }
    }
}
