use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use serde_json::json;
use tracing::error;

use crate::api::achievements::achievements_json;
use crate::api::middleware::CurrentUser;
use crate::entities::{user, User};
use crate::notifications::{self, Mailer};
use crate::scoring::ledger::{self, json_strings};
use crate::scoring::AchievementEngine;

#[derive(serde::Deserialize)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    email: Option<String>,
    is_private: Option<bool>,
    notifications_enabled: Option<bool>,
}

#[derive(serde::Deserialize)]
pub struct AddFriendRequest {
    friend_id: String,
}

#[derive(serde::Deserialize)]
pub struct QuizResultRequest {
    correct: bool,
    points: Option<i64>,
}

fn profile_json(user: &user::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "total_points": user.total_points,
        "weekly_points": user.weekly_points,
        "badges": user.badges,
        "friends": user.friends,
        "is_private": user.is_private,
        "notifications_enabled": user.notifications_enabled,
        "quiz": {
            "current_streak": user.quiz_current_streak,
            "best_streak": user.quiz_best_streak,
            "total_correct": user.quiz_total_correct,
        },
    })
}

/// Profile read. Creates the aggregate on first contact, so a fresh signup
/// sees zeroed totals instead of a 404.
pub async fn get_profile(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Utc::now().date_naive();
    let user = ledger::ensure_user(&db, &user_id, today).await.map_err(|e| {
        error!("Failed to ensure profile for user {}: {}", user_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
    })?;
    Ok(Json(profile_json(&user)))
}

pub async fn update_profile(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Utc::now().date_naive();
    let user = ledger::ensure_user(&db, &user_id, today).await.map_err(|e| {
        error!("Failed to ensure profile for user {}: {}", user_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
    })?;

    let mut active = user.into_active_model();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(is_private) = payload.is_private {
        active.is_private = Set(is_private);
    }
    if let Some(enabled) = payload.notifications_enabled {
        active.notifications_enabled = Set(enabled);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    match active.update(&db).await {
        Ok(user) => Ok(Json(profile_json(&user))),
        Err(e) => {
            error!("Failed to update profile for user {}: {}", user_id, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)))
        }
    }
}

pub async fn add_friend(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<AddFriendRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.friend_id == user_id {
        return Err((
            StatusCode::BAD_REQUEST,
            "Cannot add yourself as a friend".to_string(),
        ));
    }
    match User::find_by_id(&payload.friend_id).one(&db).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err((StatusCode::NOT_FOUND, "Friend not found".to_string())),
        Err(e) => {
            error!("Failed to look up friend {}: {}", payload.friend_id, e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)));
        }
    }

    let today = Utc::now().date_naive();
    let user = ledger::ensure_user(&db, &user_id, today).await.map_err(|e| {
        error!("Failed to ensure profile for user {}: {}", user_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
    })?;

    let mut friends = json_strings(&user.friends);
    if friends.iter().any(|id| id == &payload.friend_id) {
        return Ok(Json(profile_json(&user)));
    }
    friends.push(payload.friend_id);

    let mut active = user.into_active_model();
    active.friends = Set(json!(friends));
    active.updated_at = Set(Utc::now().naive_utc());
    match active.update(&db).await {
        Ok(user) => Ok(Json(profile_json(&user))),
        Err(e) => {
            error!("Failed to add friend for user {}: {}", user_id, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)))
        }
    }
}

pub async fn record_quiz_result(
    Extension(db): Extension<DatabaseConnection>,
    Extension(engine): Extension<AchievementEngine>,
    Extension(mailer): Extension<Mailer>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<QuizResultRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Utc::now().date_naive();
    let points = payload.points.unwrap_or(0);

    let user = ledger::record_quiz_result(&db, &user_id, payload.correct, points, today)
        .await
        .map_err(|e| {
            error!("Failed to record quiz result for user {}: {}", user_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
        })?;

    let newly = engine.evaluate(&db, &user_id, today).await.map_err(|e| {
        error!("Achievement evaluation failed for user {}: {}", user_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
    })?;
    notifications::fan_out(&db, &mailer, &user_id, &newly).await;

    Ok(Json(json!({
        "quiz": {
            "current_streak": user.quiz_current_streak,
            "best_streak": user.quiz_best_streak,
            "total_correct": user.quiz_total_correct,
        },
        "total_points": user.total_points,
        "newly_earned": achievements_json(&newly),
    })))
}
