use crate::entities::{challenge_completion, daily_entry, user};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

pub async fn init_metrics(db: &DatabaseConnection) {
    let user_count = user::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("ecotrack_users_total").set(user_count as f64);

    let entry_count = daily_entry::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("ecotrack_entries_total").set(entry_count as f64);

    let completion_count = challenge_completion::Entity::find()
        .count(db)
        .await
        .unwrap_or(0);
    metrics::gauge!("ecotrack_challenge_completions_total").set(completion_count as f64);

    tracing::info!(
        "Initialized metrics: Users={}, Entries={}, Completions={}",
        user_count,
        entry_count,
        completion_count
    );
}

pub fn increment_entries_logged() {
    metrics::counter!("ecotrack_entries_logged_total").increment(1);
}

pub fn increment_challenges_completed(challenge_id: &str) {
    metrics::counter!("ecotrack_challenges_completed_total", "challenge" => challenge_id.to_string())
        .increment(1);
}

pub fn increment_achievements_awarded(achievement_id: &str) {
    metrics::counter!("ecotrack_achievements_awarded_total", "achievement" => achievement_id.to_string())
        .increment(1);
}

pub fn increment_notifications_sent(channel: &str) {
    metrics::counter!("ecotrack_notifications_sent_total", "channel" => channel.to_string())
        .increment(1);
}

pub fn increment_notifications_failed(channel: &str) {
    metrics::counter!("ecotrack_notifications_failed_total", "channel" => channel.to_string())
        .increment(1);
}
