//! Season-level backtesting: decision files in, reports out.

pub mod decisions;
pub mod report;
pub mod runner;


pub use decisions::{EncodedGameweek, GameweekEntry, IndicatorMap, SeasonDecisions};
pub use report::{
    BenchLine, GameweekFailure, GameweekOutcome, GameweekReport, PlayerLine, SeasonReport,
    SeasonSummary,
};
pub use runner::{run_backtests, RunMode, SeasonProgress, SeasonRunner};
