//! Roster legality: formation bounds and full-team validation.

pub mod formation;
pub mod validator;

pub use formation::{is_legal_formation, FormationChecker, PositionCounts};
pub use validator::{validate_team, TeamValidator};
