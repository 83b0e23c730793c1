use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde_json::json;
use tracing::error;

use crate::entities::{user, User};

#[derive(serde::Deserialize)]
pub struct LeaderboardQuery {
    period: Option<String>,
    limit: Option<u64>,
}

/// Point ranking across public profiles, either all-time or for the current
/// week window.
pub async fn get_leaderboard(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let period = query.period.as_deref().unwrap_or("total");
    let order_column = match period {
        "total" => user::Column::TotalPoints,
        "weekly" => user::Column::WeeklyPoints,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "period must be 'total' or 'weekly'".to_string(),
            ))
        }
    };
    let limit = query.limit.unwrap_or(20).min(100);

    let users = User::find()
        .filter(user::Column::IsPrivate.eq(false))
        .order_by_desc(order_column)
        .limit(limit)
        .all(&db)
        .await
        .map_err(|e| {
            error!("Failed to load leaderboard: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("DB Error: {}", e))
        })?;

    let rows: Vec<serde_json::Value> = users
        .iter()
        .enumerate()
        .map(|(i, u)| {
            json!({
                "rank": i + 1,
                "user_id": u.id,
                "name": u.name,
                "points": match period {
                    "weekly" => u.weekly_points,
                    _ => u.total_points,
                },
                "badges": u.badges,
            })
        })
        .collect();

    Ok(Json(json!({ "period": period, "leaderboard": rows })))
}
