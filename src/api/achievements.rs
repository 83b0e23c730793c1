use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;
use tracing::error;

use crate::api::middleware::CurrentUser;
use crate::entities::User;
use crate::notifications::{self, Mailer};
use crate::scoring::{ledger::json_strings, Achievement, AchievementEngine, ScoringError};

pub(crate) fn achievements_json(list: &[Achievement]) -> serde_json::Value {
    json!(list
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "name": a.name,
                "description": a.description,
                "icon": a.icon,
                "points_bonus": a.points_bonus,
            })
        })
        .collect::<Vec<_>>())
}

/// Full catalog, flagged with what the caller has already earned.
pub async fn list_achievements(
    Extension(db): Extension<DatabaseConnection>,
    Extension(engine): Extension<AchievementEngine>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let earned = match User::find_by_id(&user_id).one(&db).await {
        Ok(Some(user)) => json_strings(&user.earned_achievements),
        Ok(None) => Vec::new(),
        Err(e) => {
            error!("Failed to load user {}: {}", user_id, e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)));
        }
    };

    let catalog: Vec<serde_json::Value> = engine
        .catalog()
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "name": a.name,
                "description": a.description,
                "icon": a.icon,
                "points_bonus": a.points_bonus,
                "earned": earned.iter().any(|id| id == a.id),
            })
        })
        .collect();
    Ok(Json(json!({ "achievements": catalog })))
}

pub async fn list_earned(
    Extension(db): Extension<DatabaseConnection>,
    Extension(engine): Extension<AchievementEngine>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = match User::find_by_id(&user_id).one(&db).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "User not found".to_string())),
        Err(e) => {
            error!("Failed to load user {}: {}", user_id, e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)));
        }
    };

    let earned_ids = json_strings(&user.earned_achievements);
    let earned: Vec<Achievement> = engine
        .catalog()
        .iter()
        .filter(|a| earned_ids.iter().any(|id| id == a.id))
        .copied()
        .collect();
    Ok(Json(json!({
        "earned": achievements_json(&earned),
        "badges": user.badges,
    })))
}

/// Explicit re-evaluation. Normally achievements are checked after each
/// scoring operation; this exists for catalog rollouts and backfills.
pub async fn evaluate_achievements(
    Extension(db): Extension<DatabaseConnection>,
    Extension(engine): Extension<AchievementEngine>,
    Extension(mailer): Extension<Mailer>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Utc::now().date_naive();
    let newly = match engine.evaluate(&db, &user_id, today).await {
        Ok(newly) => newly,
        Err(ScoringError::UserNotFound(_)) => {
            return Err((StatusCode::NOT_FOUND, "User not found".to_string()))
        }
        Err(e) => {
            error!("Achievement evaluation failed for user {}: {}", user_id, e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e)));
        }
    };

    let notified = notifications::fan_out(&db, &mailer, &user_id, &newly).await;
    Ok(Json(json!({
        "newly_earned": achievements_json(&newly),
        "notifications_sent": notified,
    })))
}
