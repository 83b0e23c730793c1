use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user point ledger. `total_points` carries every net contribution ever
/// applied (entry deltas, challenge completions, achievement bonuses, quiz
/// points); `weekly_points` is scoped to the window starting at
/// `last_weekly_reset`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub total_points: i64,
    pub weekly_points: i64,
    pub last_weekly_reset: Date,
    // Append-only JSON arrays. Badges hold display names, earned_achievements
    // holds catalog ids (each at most once), friends holds user ids.
    #[sea_orm(column_type = "JsonBinary")]
    pub badges: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub earned_achievements: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub friends: Json,
    pub is_private: bool,
    pub notifications_enabled: bool,
    pub quiz_current_streak: i32,
    pub quiz_best_streak: i32,
    pub quiz_total_correct: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_entry::Entity")]
    DailyEntry,
    #[sea_orm(has_many = "super::challenge_completion::Entity")]
    ChallengeCompletion,
}

impl Related<super::daily_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyEntry.def()
    }
}

impl Related<super::challenge_completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChallengeCompletion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
