use super::player::PlayerId;
use crate::error::DataIntegrityError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered bench, keyed by slot number (1 = substitute GK, 2..4 = outfield
/// in auto-sub priority order).
///
/// Kept as a map rather than a fixed array so that a malformed slot set can
/// still be represented and rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchSlots(BTreeMap<u8, PlayerId>);

impl BenchSlots {
    pub const SLOTS: [u8; 4] = [1, 2, 3, 4];

    pub fn new() -> Self {
        Self::default()
    }

    /// Bench from a priority-ordered list: element 0 goes to slot 1.
    pub fn from_order(order: [PlayerId; 4]) -> Self {
        Self::SLOTS.iter().copied().zip(order).collect()
    }

    pub fn insert(&mut self, slot: u8, player: PlayerId) -> Option<PlayerId> {
        self.0.insert(slot, player)
    }

    pub fn get(&self, slot: u8) -> Option<PlayerId> {
        self.0.get(&slot).copied()
    }

    pub fn slot(&self, slot: u8) -> Result<PlayerId, DataIntegrityError> {
        self.get(slot).ok_or(DataIntegrityError::MissingBenchSlot { slot })
    }

    pub fn slot_numbers(&self) -> Vec<u8> {
        self.0.keys().copied().collect()
    }

    pub fn slot_of(&self, player: PlayerId) -> Option<u8> {
        self.0.iter().find(|(_, &id)| id == player).map(|(&slot, _)| slot)
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.0.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, PlayerId)> + '_ {
        self.0.iter().map(|(&slot, &id)| (slot, id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u8, PlayerId)> for BenchSlots {
    fn from_iter<I: IntoIterator<Item = (u8, PlayerId)>>(iter: I) -> Self {
        BenchSlots(iter.into_iter().collect())
    }
}

/// Complete team selection for one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekDecision {
    pub squad: Vec<PlayerId>,
    pub starters: Vec<PlayerId>,
    pub captain: PlayerId,
    pub vice: PlayerId,
    pub bench: BenchSlots,
}

impl GameweekDecision {
    pub fn is_starter(&self, player: PlayerId) -> bool {
        self.starters.contains(&player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_order_fills_slots_one_to_four() {
        let bench =
            BenchSlots::from_order([PlayerId(10), PlayerId(11), PlayerId(12), PlayerId(13)]);
        assert_eq!(bench.slot_numbers(), vec![1, 2, 3, 4]);
        assert_eq!(bench.get(1), Some(PlayerId(10)));
        assert_eq!(bench.slot_of(PlayerId(13)), Some(4));
    }

    #[test]
    fn test_missing_slot_is_integrity_error() {
        let bench: BenchSlots = [(1, PlayerId(1)), (3, PlayerId(3))].into_iter().collect();
        assert_eq!(bench.slot(2), Err(DataIntegrityError::MissingBenchSlot { slot: 2 }));
    }

    #[test]
    fn test_bench_serializes_as_slot_map() {
        let bench = BenchSlots::from_order([PlayerId(5), PlayerId(6), PlayerId(7), PlayerId(8)]);
        let json = serde_json::to_string(&bench).unwrap();
        assert_eq!(json, r#"{"1":5,"2":6,"3":7,"4":8}"#);
    }
}
