//! Scoring and achievement engine.
//!
//! The aggregate `users` row is the one shared mutable resource; every path
//! that touches it (entry upsert, challenge credit, quiz results,
//! achievement awards) runs as a read-modify-write inside a single
//! transaction, never a blind read-then-write, so concurrent activity for
//! the same user cannot tear the ledger.

pub mod achievements;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod streak;
pub mod upsert;

#[cfg(test)]
mod tests;

pub use achievements::AchievementEngine;
pub use catalog::{Achievement, Condition, UserMetrics, DEFAULT_CATALOG};
pub use error::{ScoringError, ScoringResult};
pub use upsert::{
    complete_challenge, upsert_entry, ChallengeOutcome, EntryInput, Impact, UpsertOutcome,
};
