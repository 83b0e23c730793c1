//! Shared ledger helpers: the weekly accounting window, lazy profile
//! creation, and the transactional point-delta application every scoring
//! operation funnels through.

use chrono::{Datelike, Days, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set, TransactionTrait,
};
use serde_json::json;

use super::error::{ScoringError, ScoringResult};
use crate::entities::{user, User};

/// Key of the week window `date` falls into: the Monday on or before it.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Reads a JSON array of strings, tolerating anything else as empty.
pub(crate) fn json_strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Loads the user's aggregate, creating a blank profile on first contact.
/// Name and email stay empty until the profile is filled in.
pub async fn ensure_user<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    today: NaiveDate,
) -> ScoringResult<user::Model> {
    if let Some(existing) = User::find_by_id(user_id).one(conn).await? {
        return Ok(existing);
    }

    let now = Utc::now().naive_utc();
    let blank = user::ActiveModel {
        id: Set(user_id.to_string()),
        name: Set(String::new()),
        email: Set(String::new()),
        total_points: Set(0),
        weekly_points: Set(0),
        last_weekly_reset: Set(week_start(today)),
        badges: Set(json!([])),
        earned_achievements: Set(json!([])),
        friends: Set(json!([])),
        is_private: Set(false),
        notifications_enabled: Set(true),
        quiz_current_streak: Set(0),
        quiz_best_streak: Set(0),
        quiz_total_correct: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(blank.insert(conn).await?)
}

/// Applies a net point delta to the aggregate. Total points always move by
/// the delta; weekly points reset to the delta when the stored window key
/// predates the current window, and accumulate otherwise. Must run inside
/// the same transaction as the write that produced the delta.
pub async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    user: user::Model,
    delta: i64,
    today: NaiveDate,
) -> ScoringResult<user::Model> {
    let window = week_start(today);
    let total = user.total_points + delta;
    let (weekly, reset) = if user.last_weekly_reset < window {
        (delta, window)
    } else {
        (user.weekly_points + delta, user.last_weekly_reset)
    };

    let mut active = user.into_active_model();
    active.total_points = Set(total);
    active.weekly_points = Set(weekly);
    active.last_weekly_reset = Set(reset);
    active.updated_at = Set(Utc::now().naive_utc());
    Ok(active.update(conn).await?)
}

/// Records one quiz answer: the running streak grows on a correct answer and
/// resets on a miss, the best streak tracks the maximum, and any awarded
/// points go through the same weekly-window ledger path as everything else.
pub async fn record_quiz_result<D>(
    db: &D,
    user_id: &str,
    correct: bool,
    points: i64,
    today: NaiveDate,
) -> ScoringResult<user::Model>
where
    D: ConnectionTrait + TransactionTrait,
{
    let uid = user_id.to_string();
    let updated = db
        .transaction::<_, user::Model, ScoringError>(move |txn| {
            Box::pin(async move {
                let user = ensure_user(txn, &uid, today).await?;

                let streak = if correct { user.quiz_current_streak + 1 } else { 0 };
                let best = user.quiz_best_streak.max(streak);
                let correct_total = user.quiz_total_correct + i32::from(correct);

                let mut active = user.into_active_model();
                active.quiz_current_streak = Set(streak);
                active.quiz_best_streak = Set(best);
                active.quiz_total_correct = Set(correct_total);
                active.updated_at = Set(Utc::now().naive_utc());
                let user = active.update(txn).await?;

                if points != 0 {
                    apply_delta(txn, user, points, today).await
                } else {
                    Ok(user)
                }
            })
        })
        .await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::{json_strings, week_start};
    use chrono::NaiveDate;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(d(2026, 3, 2)), d(2026, 3, 2)); // Monday maps to itself
        assert_eq!(week_start(d(2026, 3, 4)), d(2026, 3, 2)); // Wednesday
        assert_eq!(week_start(d(2026, 3, 8)), d(2026, 3, 2)); // Sunday still belongs to Monday's window
        assert_eq!(week_start(d(2026, 3, 9)), d(2026, 3, 9)); // next Monday opens a new window
    }

    #[test]
    fn json_strings_tolerates_malformed_values() {
        assert_eq!(json_strings(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(json_strings(&json!(["a", 7, null])), vec!["a"]);
        assert!(json_strings(&json!({"not": "an array"})).is_empty());
        assert!(json_strings(&json!(null)).is_empty());
    }
}
