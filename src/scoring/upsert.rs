//! Entry upsert engine: at most one entry per (user, calendar date), with
//! the aggregate ledger adjusted by the net delta in the same transaction.
//! Challenge completion reuses the delta path without the revision case.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::achievements::AchievementEngine;
use super::catalog::Achievement;
use super::error::{ScoringError, ScoringResult};
use super::ledger::{apply_delta, ensure_user};
use crate::entities::{challenge_completion, daily_entry, ChallengeCompletion, DailyEntry};

/// Impact vector as scored by the AI collaborator. Passed through as-is;
/// the engine performs no range validation on upstream values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub co2: f64,
    pub water: f64,
    pub energy: f64,
    pub waste: f64,
    pub food: f64,
}

#[derive(Debug, Clone)]
pub struct EntryInput {
    pub date: NaiveDate,
    pub text: String,
    pub impact: Impact,
    pub points: i64,
    pub comment: String,
    pub actions: Vec<String>,
}

#[derive(Debug)]
pub struct UpsertOutcome {
    pub entry_id: Uuid,
    /// False when an existing entry for the date was revised in place.
    pub created: bool,
    pub newly_earned: Vec<Achievement>,
}

#[derive(Debug)]
pub struct ChallengeOutcome {
    /// False when the (user, challenge) pair was already credited.
    pub applied: bool,
    pub newly_earned: Vec<Achievement>,
}

/// Upserts the user's entry for `input.date` and applies the net point delta
/// to the aggregate, atomically. A first submission contributes the full
/// points; a same-day revision contributes only the difference, so retries
/// and edits never double-count. After the commit the achievement engine
/// runs in its own transaction — bonuses are additive and idempotent, so an
/// entry commit without them is still a consistent state.
pub async fn upsert_entry<D>(
    db: &D,
    engine: &AchievementEngine,
    user_id: &str,
    input: EntryInput,
    today: NaiveDate,
) -> ScoringResult<UpsertOutcome>
where
    D: ConnectionTrait + TransactionTrait,
{
    let uid = user_id.to_string();
    let (entry_id, created) = db
        .transaction::<_, (Uuid, bool), ScoringError>(move |txn| {
            Box::pin(async move {
                let existing = DailyEntry::find()
                    .filter(daily_entry::Column::UserId.eq(&uid))
                    .filter(daily_entry::Column::Date.eq(input.date))
                    .one(txn)
                    .await?;

                let now = Utc::now().naive_utc();
                let actions = if input.actions.is_empty() {
                    None
                } else {
                    Some(json!(input.actions))
                };

                let (entry_id, delta, created) = match existing {
                    Some(entry) => {
                        let delta = input.points - entry.points;
                        let id = entry.id;
                        let mut active = entry.into_active_model();
                        active.text = Set(input.text);
                        active.co2 = Set(input.impact.co2);
                        active.water = Set(input.impact.water);
                        active.energy = Set(input.impact.energy);
                        active.waste = Set(input.impact.waste);
                        active.food = Set(input.impact.food);
                        active.points = Set(input.points);
                        active.comment = Set(input.comment);
                        active.actions = Set(actions);
                        active.updated_at = Set(now);
                        active.update(txn).await?;
                        (id, delta, false)
                    }
                    None => {
                        let id = Uuid::new_v4();
                        daily_entry::ActiveModel {
                            id: Set(id),
                            user_id: Set(uid.clone()),
                            date: Set(input.date),
                            text: Set(input.text),
                            co2: Set(input.impact.co2),
                            water: Set(input.impact.water),
                            energy: Set(input.impact.energy),
                            waste: Set(input.impact.waste),
                            food: Set(input.impact.food),
                            points: Set(input.points),
                            comment: Set(input.comment),
                            actions: Set(actions),
                            created_at: Set(now),
                            updated_at: Set(now),
                        }
                        .insert(txn)
                        .await?;
                        (id, input.points, true)
                    }
                };

                let user = ensure_user(txn, &uid, today).await?;
                apply_delta(txn, user, delta, today).await?;

                Ok((entry_id, created))
            })
        })
        .await?;

    let newly_earned = engine.evaluate(db, user_id, today).await?;
    Ok(UpsertOutcome {
        entry_id,
        created,
        newly_earned,
    })
}

/// Credits a completed challenge: one completion row plus a single positive
/// delta through the ledger. A pair that was already credited is a no-op.
pub async fn complete_challenge<D>(
    db: &D,
    engine: &AchievementEngine,
    user_id: &str,
    challenge_id: &str,
    points: i64,
    today: NaiveDate,
) -> ScoringResult<ChallengeOutcome>
where
    D: ConnectionTrait + TransactionTrait,
{
    let uid = user_id.to_string();
    let cid = challenge_id.to_string();
    let applied = db
        .transaction::<_, bool, ScoringError>(move |txn| {
            Box::pin(async move {
                let existing = ChallengeCompletion::find()
                    .filter(challenge_completion::Column::UserId.eq(&uid))
                    .filter(challenge_completion::Column::ChallengeId.eq(&cid))
                    .one(txn)
                    .await?;
                if existing.is_some() {
                    return Ok(false);
                }

                challenge_completion::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(uid.clone()),
                    challenge_id: Set(cid),
                    points: Set(points),
                    completed_at: Set(Utc::now().naive_utc()),
                }
                .insert(txn)
                .await?;

                let user = ensure_user(txn, &uid, today).await?;
                apply_delta(txn, user, points, today).await?;

                Ok(true)
            })
        })
        .await?;

    let newly_earned = engine.evaluate(db, user_id, today).await?;
    Ok(ChallengeOutcome {
        applied,
        newly_earned,
    })
}

/// Date-descending entry listing (the ordered range read behind history
/// views and the streak endpoint).
pub async fn entries_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    limit: Option<u64>,
) -> ScoringResult<Vec<daily_entry::Model>> {
    let mut query = DailyEntry::find()
        .filter(daily_entry::Column::UserId.eq(user_id))
        .order_by_desc(daily_entry::Column::Date);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(query.all(conn).await?)
}

pub async fn entry_for_date<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    date: NaiveDate,
) -> ScoringResult<daily_entry::Model> {
    DailyEntry::find()
        .filter(daily_entry::Column::UserId.eq(user_id))
        .filter(daily_entry::Column::Date.eq(date))
        .one(conn)
        .await?
        .ok_or_else(|| ScoringError::EntryNotFound {
            user_id: user_id.to_string(),
            date,
        })
}
