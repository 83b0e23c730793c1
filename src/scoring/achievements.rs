//! Achievement rule engine. Every evaluation re-derives the user's metrics
//! from the store inside the transaction — no cached counter is trusted —
//! and awards all newly satisfied achievements together, exactly once.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;

use super::catalog::{Achievement, UserMetrics};
use super::error::{ScoringError, ScoringResult};
use super::ledger::json_strings;
use super::streak;
use crate::entities::{challenge_completion, daily_entry, user, ChallengeCompletion, DailyEntry, User};

#[derive(Clone, Copy)]
pub struct AchievementEngine {
    catalog: &'static [Achievement],
}

impl AchievementEngine {
    pub fn new(catalog: &'static [Achievement]) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static [Achievement] {
        self.catalog
    }

    /// Re-evaluates the whole catalog for one user and awards whatever newly
    /// qualifies. Awards are gated on the earned set, so a repeat call with
    /// no new activity returns empty and writes nothing. The returned list
    /// preserves catalog order.
    pub async fn evaluate<D>(
        &self,
        db: &D,
        user_id: &str,
        today: NaiveDate,
    ) -> ScoringResult<Vec<Achievement>>
    where
        D: ConnectionTrait + TransactionTrait,
    {
        let catalog = self.catalog;
        let uid = user_id.to_string();
        let newly = db
            .transaction::<_, Vec<Achievement>, ScoringError>(move |txn| {
                Box::pin(async move {
                    let user = User::find_by_id(&uid)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ScoringError::UserNotFound(uid.clone()))?;

                    let earned = json_strings(&user.earned_achievements);
                    let metrics = collect_metrics(txn, &user, today).await?;

                    let newly: Vec<Achievement> = catalog
                        .iter()
                        .filter(|a| !earned.iter().any(|id| id == a.id))
                        .filter(|a| a.condition.is_met(&metrics))
                        .copied()
                        .collect();
                    if newly.is_empty() {
                        return Ok(newly);
                    }

                    let bonus: i64 = newly.iter().map(|a| a.points_bonus).sum();
                    let mut ids = earned;
                    let mut badges = json_strings(&user.badges);
                    for a in &newly {
                        ids.push(a.id.to_string());
                        badges.push(a.name.to_string());
                    }

                    let total = user.total_points + bonus;
                    let mut active = user.into_active_model();
                    active.earned_achievements = Set(json!(ids));
                    active.badges = Set(json!(badges));
                    active.total_points = Set(total);
                    active.updated_at = Set(Utc::now().naive_utc());
                    active.update(txn).await?;

                    Ok(newly)
                })
            })
            .await?;

        if !newly.is_empty() {
            for a in &newly {
                crate::metrics::increment_achievements_awarded(a.id);
            }
            info!(
                "User {} earned {} achievement(s): {}",
                user_id,
                newly.len(),
                newly.iter().map(|a| a.id).collect::<Vec<_>>().join(", ")
            );
        }
        Ok(newly)
    }
}

/// Derives the metric snapshot the rules check against, fresh from the store.
pub async fn collect_metrics<C: ConnectionTrait>(
    conn: &C,
    user: &user::Model,
    today: NaiveDate,
) -> ScoringResult<UserMetrics> {
    let entries = DailyEntry::find()
        .filter(daily_entry::Column::UserId.eq(&user.id))
        .all(conn)
        .await?;
    let challenges_completed = ChallengeCompletion::find()
        .filter(challenge_completion::Column::UserId.eq(&user.id))
        .count(conn)
        .await?;

    let mut metrics = UserMetrics {
        total_points: user.total_points,
        entries_logged: entries.len() as u64,
        challenges_completed,
        quiz_streak: user.quiz_current_streak,
        ..Default::default()
    };
    for entry in &entries {
        metrics.co2_saved += entry.co2;
        metrics.water_saved += entry.water;
        metrics.energy_saved += entry.energy;
        metrics.waste_avoided += entry.waste;
    }
    metrics.streak_days = streak::compute_streak(&entries, today);

    Ok(metrics)
}
