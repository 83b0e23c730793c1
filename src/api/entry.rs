use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::error;

use crate::ai::ImpactAnalyzer;
use crate::api::achievements::achievements_json;
use crate::api::middleware::CurrentUser;
use crate::notifications::{self, Mailer};
use crate::scoring::{
    self,
    upsert::{entries_for_user, entry_for_date},
    AchievementEngine, EntryInput, ScoringError,
};

#[derive(serde::Deserialize)]
pub struct CreateEntryRequest {
    text: String,
    // Defaults to today; the UI passes an explicit date when editing a
    // previous day.
    date: Option<NaiveDate>,
}

#[derive(serde::Deserialize)]
pub struct ListEntriesQuery {
    limit: Option<u64>,
}

pub async fn create_entry(
    Extension(db): Extension<DatabaseConnection>,
    Extension(engine): Extension<AchievementEngine>,
    Extension(analyzer): Extension<ImpactAnalyzer>,
    Extension(mailer): Extension<Mailer>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Entry text must not be empty".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let date = payload.date.unwrap_or(today);

    let analysis = analyzer.analyze_entry(&payload.text).await.map_err(|e| {
        error!("Entry analysis failed: {}", e);
        (StatusCode::BAD_GATEWAY, format!("Analysis failed: {}", e))
    })?;

    let input = EntryInput {
        date,
        text: payload.text,
        impact: analysis.impact,
        points: analysis.points,
        comment: analysis.comment.clone(),
        actions: analysis.actions.clone(),
    };
    let outcome = scoring::upsert_entry(&db, &engine, &user_id, input, today)
        .await
        .map_err(|e| {
            error!("Entry upsert failed for user {}: {}", user_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
        })?;

    crate::metrics::increment_entries_logged();
    notifications::fan_out(&db, &mailer, &user_id, &outcome.newly_earned).await;

    Ok(Json(json!({
        "entry_id": outcome.entry_id,
        "created": outcome.created,
        "date": date,
        "points": analysis.points,
        "impact": analysis.impact,
        "comment": analysis.comment,
        "actions": analysis.actions,
        "newly_earned": achievements_json(&outcome.newly_earned),
    })))
}

pub async fn list_entries(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = entries_for_user(&db, &user_id, query.limit)
        .await
        .map_err(|e| {
            error!("Failed to list entries for user {}: {}", user_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
        })?;
    Ok(Json(entries))
}

pub async fn get_entry(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(date): Path<NaiveDate>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match entry_for_date(&db, &user_id, date).await {
        Ok(entry) => Ok(Json(entry)),
        Err(ScoringError::EntryNotFound { .. }) => {
            Err((StatusCode::NOT_FOUND, "Entry not found".to_string()))
        }
        Err(e) => {
            error!("Failed to fetch entry for user {}: {}", user_id, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)))
        }
    }
}

pub async fn get_streak(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Utc::now().date_naive();
    let entries = entries_for_user(&db, &user_id, None).await.map_err(|e| {
        error!("Failed to load entries for streak: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
    })?;
    let streak = scoring::streak::compute_streak(&entries, today);
    Ok(Json(json!({ "streak": streak })))
}
