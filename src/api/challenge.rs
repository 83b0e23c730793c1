use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::{error, info};

use crate::api::achievements::achievements_json;
use crate::api::middleware::CurrentUser;
use crate::notifications::{self, Mailer};
use crate::scoring::{self, AchievementEngine};

#[derive(serde::Deserialize)]
pub struct CompleteChallengeRequest {
    points: i64,
}

pub async fn complete_challenge(
    Extension(db): Extension<DatabaseConnection>,
    Extension(engine): Extension<AchievementEngine>,
    Extension(mailer): Extension<Mailer>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(challenge_id): Path<String>,
    Json(payload): Json<CompleteChallengeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.points <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Challenge points must be positive".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let outcome = scoring::complete_challenge(
        &db,
        &engine,
        &user_id,
        &challenge_id,
        payload.points,
        today,
    )
    .await
    .map_err(|e| {
        error!(
            "Challenge completion failed for user {} on {}: {}",
            user_id, challenge_id, e
        );
        (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
    })?;

    if outcome.applied {
        crate::metrics::increment_challenges_completed(&challenge_id);
        info!("User {} completed challenge {}", user_id, challenge_id);
    }
    notifications::fan_out(&db, &mailer, &user_id, &outcome.newly_earned).await;

    Ok(Json(json!({
        "challenge_id": challenge_id,
        "applied": outcome.applied,
        "newly_earned": achievements_json(&outcome.newly_earned),
    })))
}
