//! City donation ranking
//!
//! - `index`: dense rank assignment over the aggregate set
//! - `engine`: the orchestrator (validation, write gate, read snapshots)
//! - `views`: serializable projections returned to callers

mod engine;
mod index;
mod views;

pub use engine::RankingEngine;
pub use index::{RankingIndex, assign_ranks, compare_for_rank};
pub use views::{CityContext, CityRanking, CityStatistics, GlobalStatistics, Leaderboard};
