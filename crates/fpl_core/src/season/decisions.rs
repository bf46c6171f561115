//! Season decision files.
//!
//! A decision file is a JSON object keyed `gw1`, `gw2`, ... Each entry holds
//! binary indicator maps from player id (as a string) to 0 or 1:
//!
//! | key | meaning |
//! |---|---|
//! | `y` | squad |
//! | `x` | starting XI |
//! | `c` | captain (exactly one) |
//! | `v` | vice-captain (exactly one) |
//! | `b1`..`b4` | bench slots (exactly one each) |
//!
//! `v` and the bench maps may be absent, in which case roles are derived at
//! run time. Solver state keys (`y0`, `p0`, `B_bank`, `f`) are ignored.

use crate::error::{CoreError, DataIntegrityError};
use crate::models::{BenchSlots, GameweekDecision, GameweekSnapshot, PlayerId};
use crate::roles::{RoleAssigner, RoleAssignment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Player id (string form) to 0/1 indicator.
pub type IndicatorMap = BTreeMap<String, u8>;

#[derive(Debug, Deserialize)]
struct RawGameweek {
    x: BTreeMap<String, f64>,
    y: BTreeMap<String, f64>,
    c: BTreeMap<String, f64>,
    #[serde(default)]
    v: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    b1: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    b2: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    b3: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    b4: Option<BTreeMap<String, f64>>,
}

/// Indicator maps for one gameweek, as written to a decision file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedGameweek {
    pub x: IndicatorMap,
    pub y: IndicatorMap,
    pub c: IndicatorMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<IndicatorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b1: Option<IndicatorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b2: Option<IndicatorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b3: Option<IndicatorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b4: Option<IndicatorMap>,
}

/// Solver output within this distance of 0 or 1 counts as that value.
const INDICATOR_TOLERANCE: f64 = 1e-6;

/// Ids flagged 1, in ascending id order.
fn selected(map: &BTreeMap<String, f64>) -> Result<Vec<PlayerId>, DataIntegrityError> {
    let mut ids = Vec::new();
    for (key, &raw) in map {
        if raw.abs() < INDICATOR_TOLERANCE {
            continue;
        }
        let is_one = (raw - 1.0).abs() < INDICATOR_TOLERANCE;
        if !is_one {
            return Err(DataIntegrityError::MalformedIndicator {
                key: key.clone(),
                value: raw.to_string(),
            });
        }
        let id = key
            .parse::<PlayerId>()
            .map_err(|_| DataIntegrityError::MalformedPlayerKey { key: key.clone() })?;
        ids.push(id);
    }
    ids.sort_unstable();
    Ok(ids)
}

fn single(
    gameweek: u8,
    key: &str,
    map: Option<&BTreeMap<String, f64>>,
) -> Result<PlayerId, DataIntegrityError> {
    let ids = match map {
        Some(map) => selected(map)?,
        None => Vec::new(),
    };
    match ids.as_slice() {
        [id] => Ok(*id),
        _ => Err(DataIntegrityError::IndicatorCount {
            gameweek,
            key: key.to_string(),
            found: ids.len(),
        }),
    }
}

fn parse_gameweek_key(key: &str, max: u8) -> Result<u8, DataIntegrityError> {
    key.strip_prefix("gw")
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|gw| (1..=max).contains(gw))
        .ok_or_else(|| DataIntegrityError::MalformedGameweekKey { key: key.to_string(), max })
}

fn indicator(universe: &[PlayerId], chosen: impl Fn(PlayerId) -> bool) -> IndicatorMap {
    universe.iter().map(|&id| (id.to_string(), u8::from(chosen(id)))).collect()
}

/// One gameweek's selection. Roles are optional; when absent they are
/// derived with a [`RoleAssigner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameweekEntry {
    pub squad: Vec<PlayerId>,
    pub starters: Vec<PlayerId>,
    pub captain: PlayerId,
    pub roles: Option<RoleAssignment>,
}

impl GameweekEntry {
    fn decode(gameweek: u8, raw: &RawGameweek) -> Result<Self, DataIntegrityError> {
        let squad = selected(&raw.y)?;
        let starters = selected(&raw.x)?;
        let captain = single(gameweek, "c", Some(&raw.c))?;

        let roles = match &raw.v {
            None => None,
            Some(v) => {
                let vice = single(gameweek, "v", Some(v))?;
                let bench = [("b1", &raw.b1), ("b2", &raw.b2), ("b3", &raw.b3), ("b4", &raw.b4)]
                    .into_iter()
                    .zip(BenchSlots::SLOTS)
                    .map(|((key, map), slot)| {
                        single(gameweek, key, map.as_ref()).map(|id| (slot, id))
                    })
                    .collect::<Result<BenchSlots, _>>()?;
                Some(RoleAssignment { vice, bench })
            }
        };

        Ok(Self { squad, starters, captain, roles })
    }

    /// Full selection, deriving any missing roles from `snapshot`.
    pub fn decision(
        &self,
        snapshot: &GameweekSnapshot,
        assigner: &RoleAssigner,
    ) -> Result<GameweekDecision, DataIntegrityError> {
        let roles = match &self.roles {
            Some(roles) => roles.clone(),
            None => assigner.assign(snapshot, &self.squad, &self.starters, self.captain)?,
        };
        Ok(roles.complete(self.squad.clone(), self.starters.clone(), self.captain))
    }

    /// Indicator maps over `universe` (every id gets a 0 or 1).
    pub fn encode(&self, universe: &[PlayerId]) -> EncodedGameweek {
        let slot_map = |slot: u8| {
            self.roles
                .as_ref()
                .map(|r| indicator(universe, |id| r.bench.get(slot) == Some(id)))
        };

        EncodedGameweek {
            x: indicator(universe, |id| self.starters.contains(&id)),
            y: indicator(universe, |id| self.squad.contains(&id)),
            c: indicator(universe, |id| id == self.captain),
            v: self.roles.as_ref().map(|r| indicator(universe, |id| id == r.vice)),
            b1: slot_map(1),
            b2: slot_map(2),
            b3: slot_map(3),
            b4: slot_map(4),
        }
    }
}

impl From<GameweekDecision> for GameweekEntry {
    fn from(decision: GameweekDecision) -> Self {
        Self {
            squad: decision.squad,
            starters: decision.starters,
            captain: decision.captain,
            roles: Some(RoleAssignment { vice: decision.vice, bench: decision.bench }),
        }
    }
}

/// Decoded decision file, keyed by gameweek.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonDecisions {
    entries: BTreeMap<u8, GameweekEntry>,
}

impl SeasonDecisions {
    pub const DEFAULT_MAX_GAMEWEEK: u8 = 38;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Self::from_json_with_max(json, Self::DEFAULT_MAX_GAMEWEEK)
    }

    /// Decode, accepting gameweek keys `gw1..gw{max_gameweek}`.
    pub fn from_json_with_max(json: &str, max_gameweek: u8) -> Result<Self, CoreError> {
        let raw: BTreeMap<String, RawGameweek> = serde_json::from_str(json)?;

        let mut entries = BTreeMap::new();
        for (key, gameweek) in &raw {
            let gw = parse_gameweek_key(key, max_gameweek)?;
            let entry = GameweekEntry::decode(gw, gameweek)
                .map_err(|e| CoreError::from(e).in_gameweek(gw))?;
            entries.insert(gw, entry);
        }

        log::debug!("decoded {} gameweek decisions", entries.len());
        Ok(Self { entries })
    }

    pub fn insert(&mut self, gameweek: u8, entry: impl Into<GameweekEntry>) {
        self.entries.insert(gameweek, entry.into());
    }

    pub fn get(&self, gameweek: u8) -> Option<&GameweekEntry> {
        self.entries.get(&gameweek)
    }

    pub fn gameweeks(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &GameweekEntry)> {
        self.entries.iter().map(|(&gw, entry)| (gw, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode every entry over its own squad and starters.
    pub fn to_json(&self) -> Result<String, CoreError> {
        let encoded: BTreeMap<String, EncodedGameweek> = self
            .entries
            .iter()
            .map(|(gw, entry)| {
                let mut universe: Vec<PlayerId> =
                    entry.squad.iter().chain(&entry.starters).copied().collect();
                universe.sort_unstable();
                universe.dedup();
                (format!("gw{gw}"), entry.encode(&universe))
            })
            .collect();
        Ok(serde_json::to_string_pretty(&encoded)?)
    }
}
