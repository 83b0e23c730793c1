//! Engine tests against in-memory SQLite with the real migrations, plus a
//! mock connection for the store-failure path. The catalog is injected, so
//! ledger tests run with an empty catalog and award tests bring their own.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    DbErr, EntityTrait, MockDatabase, QueryFilter,
};
use sea_orm_migration::MigratorTrait;

use super::catalog::{Achievement, Condition};
use super::ledger::{json_strings, record_quiz_result};
use super::{
    complete_challenge, upsert_entry, AchievementEngine, EntryInput, Impact, ScoringError,
};
use crate::entities::{daily_entry, user, DailyEntry, User};
use crate::migrator::Migrator;

const USER: &str = "user-1";

const NO_ACHIEVEMENTS: &[Achievement] = &[];

const POINT_MILESTONES: &[Achievement] = &[
    Achievement {
        id: "hundred",
        name: "Hundred",
        description: "Reach 100 points",
        icon: "⭐",
        points_bonus: 10,
        condition: Condition::TotalPoints(100),
    },
    Achievement {
        id: "five_hundred",
        name: "Five Hundred",
        description: "Reach 500 points",
        icon: "🌟",
        points_bonus: 25,
        condition: Condition::TotalPoints(500),
    },
];

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// 2026-03-02 is a Monday; 2026-03-04 a Wednesday.
fn today() -> NaiveDate {
    d(2026, 3, 4)
}

async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

fn entry(date: NaiveDate, points: i64) -> EntryInput {
    EntryInput {
        date,
        text: "Biked to work instead of driving".to_string(),
        impact: Impact {
            co2: 2.5,
            ..Default::default()
        },
        points,
        comment: "Nice ride!".to_string(),
        actions: vec!["cycling".to_string()],
    }
}

async fn load_user(db: &DatabaseConnection) -> user::Model {
    User::find_by_id(USER).one(db).await.unwrap().unwrap()
}

async fn load_entries(db: &DatabaseConnection) -> Vec<daily_entry::Model> {
    DailyEntry::find()
        .filter(daily_entry::Column::UserId.eq(USER))
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn first_upsert_creates_entry_and_profile() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    let outcome = upsert_entry(&db, &engine, USER, entry(today(), 30), today())
        .await
        .unwrap();
    assert!(outcome.created);

    let user = load_user(&db).await;
    assert_eq!(user.total_points, 30);
    assert_eq!(user.weekly_points, 30);
    assert_eq!(user.last_weekly_reset, d(2026, 3, 2));
}

#[tokio::test]
async fn same_day_revision_applies_the_delta_once() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    let first = upsert_entry(&db, &engine, USER, entry(today(), 30), today())
        .await
        .unwrap();
    let second = upsert_entry(&db, &engine, USER, entry(today(), 12), today())
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(first.entry_id, second.entry_id);

    let entries = load_entries(&db).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].points, 12);

    // Never 30 + 12: the revision contributed only the difference.
    let user = load_user(&db).await;
    assert_eq!(user.total_points, 12);
    assert_eq!(user.weekly_points, 12);
}

#[tokio::test]
async fn resubmitting_identical_input_is_idempotent() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    upsert_entry(&db, &engine, USER, entry(today(), 30), today())
        .await
        .unwrap();
    upsert_entry(&db, &engine, USER, entry(today(), 30), today())
        .await
        .unwrap();

    assert_eq!(load_entries(&db).await.len(), 1);
    assert_eq!(load_user(&db).await.total_points, 30);
}

#[tokio::test]
async fn weekly_window_resets_to_the_new_delta() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    // Logged in the prior window (Wednesday 2026-02-25, window key 02-23).
    let last_week = d(2026, 2, 25);
    upsert_entry(&db, &engine, USER, entry(last_week, 40), last_week)
        .await
        .unwrap();
    let user = load_user(&db).await;
    assert_eq!(user.weekly_points, 40);
    assert_eq!(user.last_weekly_reset, d(2026, 2, 23));

    // The next upsert in the new window resets weekly to exactly the delta.
    upsert_entry(&db, &engine, USER, entry(today(), 10), today())
        .await
        .unwrap();
    let user = load_user(&db).await;
    assert_eq!(user.total_points, 50);
    assert_eq!(user.weekly_points, 10);
    assert_eq!(user.last_weekly_reset, d(2026, 3, 2));
}

#[tokio::test]
async fn weekly_window_accumulates_within_the_window() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    upsert_entry(&db, &engine, USER, entry(d(2026, 3, 3), 30), d(2026, 3, 3))
        .await
        .unwrap();
    upsert_entry(&db, &engine, USER, entry(today(), 12), today())
        .await
        .unwrap();

    let user = load_user(&db).await;
    assert_eq!(user.total_points, 42);
    assert_eq!(user.weekly_points, 42);
}

#[tokio::test]
async fn crossing_two_thresholds_awards_both_in_one_pass() {
    let db = test_db().await;
    let engine = AchievementEngine::new(POINT_MILESTONES);

    let outcome = upsert_entry(&db, &engine, USER, entry(today(), 600), today())
        .await
        .unwrap();
    let ids: Vec<&str> = outcome.newly_earned.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["hundred", "five_hundred"]);

    let user = load_user(&db).await;
    assert_eq!(user.total_points, 600 + 10 + 25);
    assert_eq!(
        json_strings(&user.earned_achievements),
        vec!["hundred", "five_hundred"]
    );
    assert_eq!(json_strings(&user.badges), vec!["Hundred", "Five Hundred"]);
}

#[tokio::test]
async fn evaluate_is_a_no_op_without_new_activity() {
    let db = test_db().await;
    let engine = AchievementEngine::new(POINT_MILESTONES);

    upsert_entry(&db, &engine, USER, entry(today(), 600), today())
        .await
        .unwrap();
    let before = load_user(&db).await;

    let again = engine.evaluate(&db, USER, today()).await.unwrap();
    assert!(again.is_empty());

    // No writes at all, down to the updated_at column.
    let after = load_user(&db).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn streak_achievement_triggers_on_the_third_day() {
    const STREAKS: &[Achievement] = &[Achievement {
        id: "three_day",
        name: "Three Day",
        description: "Log three days in a row",
        icon: "📅",
        points_bonus: 10,
        condition: Condition::StreakDays(3),
    }];
    let db = test_db().await;
    let engine = AchievementEngine::new(STREAKS);

    let first = upsert_entry(&db, &engine, USER, entry(d(2026, 3, 2), 5), today())
        .await
        .unwrap();
    assert!(first.newly_earned.is_empty());
    let second = upsert_entry(&db, &engine, USER, entry(d(2026, 3, 3), 5), today())
        .await
        .unwrap();
    assert!(second.newly_earned.is_empty());

    let third = upsert_entry(&db, &engine, USER, entry(today(), 5), today())
        .await
        .unwrap();
    let ids: Vec<&str> = third.newly_earned.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["three_day"]);
    assert_eq!(load_user(&db).await.total_points, 15 + 10);
}

#[tokio::test]
async fn evaluate_requires_an_existing_user() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    let err = engine.evaluate(&db, "ghost", today()).await.unwrap_err();
    assert!(matches!(err, ScoringError::UserNotFound(id) if id == "ghost"));
}

#[tokio::test]
async fn challenge_completion_is_credited_once() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    let first = complete_challenge(&db, &engine, USER, "bike-week", 50, today())
        .await
        .unwrap();
    assert!(first.applied);
    let second = complete_challenge(&db, &engine, USER, "bike-week", 50, today())
        .await
        .unwrap();
    assert!(!second.applied);

    let user = load_user(&db).await;
    assert_eq!(user.total_points, 50);
    assert_eq!(user.weekly_points, 50);
}

#[tokio::test]
async fn quiz_results_track_streak_and_points() {
    let db = test_db().await;

    record_quiz_result(&db, USER, true, 5, today()).await.unwrap();
    let user = record_quiz_result(&db, USER, true, 5, today()).await.unwrap();
    assert_eq!(user.quiz_current_streak, 2);
    assert_eq!(user.quiz_best_streak, 2);
    assert_eq!(user.quiz_total_correct, 2);
    assert_eq!(user.total_points, 10);
    assert_eq!(user.weekly_points, 10);

    let user = record_quiz_result(&db, USER, false, 0, today()).await.unwrap();
    assert_eq!(user.quiz_current_streak, 0);
    assert_eq!(user.quiz_best_streak, 2);
    assert_eq!(user.total_points, 10);
}

#[tokio::test]
async fn failed_batch_rolls_back_completely_and_retry_converges() {
    let db = test_db().await;
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    upsert_entry(&db, &engine, USER, entry(today(), 10), today())
        .await
        .unwrap();

    // Hide the users table so the aggregate update inside the transaction
    // fails after the entry overwrite has already executed.
    db.execute_unprepared("ALTER TABLE users RENAME TO users_unavailable")
        .await
        .unwrap();
    let result = upsert_entry(&db, &engine, USER, entry(today(), 25), today()).await;
    assert!(result.is_err());
    db.execute_unprepared("ALTER TABLE users_unavailable RENAME TO users")
        .await
        .unwrap();

    // The entry overwrite rolled back with the failed batch.
    let entries = load_entries(&db).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].points, 10);
    assert_eq!(load_user(&db).await.total_points, 10);

    // A retry converges on the intended end state.
    upsert_entry(&db, &engine, USER, entry(today(), 25), today())
        .await
        .unwrap();
    let entries = load_entries(&db).await;
    assert_eq!(entries[0].points, 25);
    assert_eq!(load_user(&db).await.total_points, 25);
}

#[tokio::test]
async fn store_failure_surfaces_as_a_db_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection();
    let engine = AchievementEngine::new(NO_ACHIEVEMENTS);

    let err = upsert_entry(&db, &engine, USER, entry(today(), 10), today())
        .await
        .unwrap_err();
    assert!(matches!(err, ScoringError::Db(_)));
}
