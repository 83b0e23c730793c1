pub mod achievements;
pub mod challenge;
pub mod entry;
pub mod leaderboard;
pub mod middleware;
pub mod user;
