use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One journal entry per (user_id, date). Uniqueness is enforced by the
/// upsert engine's query-before-write, not by a database constraint.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "daily_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip_deserializing)]
    pub id: Uuid,
    pub user_id: String,
    pub date: Date,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    // Impact vector as scored by the AI collaborator. Unvalidated upstream
    // input, units: kg CO2, liters, kWh, kg, kg.
    pub co2: f64,
    pub water: f64,
    pub energy: f64,
    pub waste: f64,
    pub food: f64,
    pub points: i64,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub actions: Option<Json>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
