//! Test Fixtures Module
//!
//! Shared builders for gameweek data and team selections used across the
//! crate's unit tests.
//!
//! The standard team (ids 1..=15) is a legal 4-4-2:
//!
//! | ids | position | role |
//! |---|---|---|
//! | 1 | GK | starter |
//! | 2 | GK | bench slot 1 |
//! | 3-6 | DEF | starters |
//! | 7 | DEF | bench slot 2 |
//! | 8-11 | MID | starters |
//! | 12 | MID | bench slot 3 |
//! | 13 | FWD | bench slot 4 |
//! | 14-15 | FWD | starters |
//!
//! Captain is 14 (8 pts), vice is 8 (5 pts), everyone else scores 2. All
//! players play 90 minutes and cost 50.

use crate::models::{
    BenchSlots, GameweekDecision, GameweekSnapshot, PlayerId, PlayerSnapshot, Position,
};

pub fn player(
    id: u32,
    position: Position,
    club: &str,
    points: i32,
    minutes: u32,
) -> PlayerSnapshot {
    PlayerSnapshot {
        id: PlayerId(id),
        name: format!("Player {id}"),
        position,
        club: club.to_string(),
        cost: 50,
        points,
        minutes,
        available: true,
        expected_points: f64::from(points),
    }
}

pub fn ids(raw: &[u32]) -> Vec<PlayerId> {
    raw.iter().copied().map(PlayerId).collect()
}

pub fn standard_position(id: u32) -> Position {
    match id {
        1 | 2 => Position::GK,
        3..=7 => Position::DEF,
        8..=12 => Position::MID,
        _ => Position::FWD,
    }
}

pub struct TeamFixture {
    pub snapshot: GameweekSnapshot,
    pub decision: GameweekDecision,
}

impl TeamFixture {
    fn rebuild(&mut self, mut edit: impl FnMut(&mut PlayerSnapshot)) {
        let gameweek = self.snapshot.gameweek();
        let players: Vec<PlayerSnapshot> = self
            .snapshot
            .iter()
            .cloned()
            .map(|mut p| {
                edit(&mut p);
                p
            })
            .collect();
        self.snapshot = GameweekSnapshot::new(gameweek, players).expect("fixture ids are unique");
    }

    pub fn add_player(
        &mut self,
        id: u32,
        position: Position,
        club: &str,
        points: i32,
        minutes: u32,
    ) -> PlayerId {
        let gameweek = self.snapshot.gameweek();
        let mut players: Vec<PlayerSnapshot> = self.snapshot.iter().cloned().collect();
        players.push(player(id, position, club, points, minutes));
        self.snapshot = GameweekSnapshot::new(gameweek, players).expect("fixture ids are unique");
        PlayerId(id)
    }

    pub fn set_club(&mut self, raw_ids: &[u32], club: &str) {
        self.rebuild(|p| {
            if raw_ids.contains(&p.id.0) {
                p.club = club.to_string();
            }
        });
    }

    pub fn set_minutes(&mut self, raw_ids: &[u32], minutes: u32) {
        self.rebuild(|p| {
            if raw_ids.contains(&p.id.0) {
                p.minutes = minutes;
            }
        });
    }

    pub fn set_points(&mut self, id: u32, points: i32) {
        self.rebuild(|p| {
            if p.id.0 == id {
                p.points = points;
            }
        });
    }

    pub fn set_expected(&mut self, id: u32, expected: f64) {
        self.rebuild(|p| {
            if p.id.0 == id {
                p.expected_points = expected;
            }
        });
    }

    pub fn set_cost(&mut self, id: u32, cost: i32) {
        self.rebuild(|p| {
            if p.id.0 == id {
                p.cost = cost;
            }
        });
    }
}

fn standard_points(id: u32) -> i32 {
    match id {
        14 => 8,
        8 => 5,
        _ => 2,
    }
}

pub fn standard_team() -> TeamFixture {
    standard_team_in(1, |id| format!("C{id:02}"))
}

/// Standard team with player `id` in club `C{clubs[id - 1]}`.
pub fn standard_team_with_clubs(clubs: &[u32]) -> TeamFixture {
    standard_team_in(1, |id| format!("C{}", clubs[(id - 1) as usize]))
}

pub fn standard_team_in(gameweek: u8, club_of: impl Fn(u32) -> String) -> TeamFixture {
    let players: Vec<PlayerSnapshot> = (1..=15)
        .map(|id| player(id, standard_position(id), &club_of(id), standard_points(id), 90))
        .collect();
    let snapshot = GameweekSnapshot::new(gameweek, players).expect("fixture ids are unique");

    let decision = GameweekDecision {
        squad: ids(&(1..=15).collect::<Vec<_>>()),
        starters: ids(&[1, 3, 4, 5, 6, 8, 9, 10, 11, 14, 15]),
        captain: PlayerId(14),
        vice: PlayerId(8),
        bench: BenchSlots::from_order([PlayerId(2), PlayerId(7), PlayerId(12), PlayerId(13)]),
    };

    TeamFixture { snapshot, decision }
}
