pub mod gameweek;
pub mod player;
pub mod team;

pub use gameweek::{GameweekSnapshot, PlayerRecord, SeasonData};
pub use player::{PlayerId, PlayerSnapshot, Position};
pub use team::{BenchSlots, GameweekDecision};
