//! SeaORM entity definitions for the leaderboard database schema.

pub mod daily_activity;
pub mod prelude;
pub mod top_repository;
