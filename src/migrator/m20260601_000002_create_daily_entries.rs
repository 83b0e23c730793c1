use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyEntries::UserId).string().not_null())
                    .col(ColumnDef::new(DailyEntries::Date).date().not_null())
                    .col(ColumnDef::new(DailyEntries::Text).text().not_null())
                    .col(
                        ColumnDef::new(DailyEntries::Co2)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyEntries::Water)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyEntries::Energy)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyEntries::Waste)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyEntries::Food)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyEntries::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DailyEntries::Comment).text().not_null())
                    .col(ColumnDef::new(DailyEntries::Actions).json_binary())
                    .col(
                        ColumnDef::new(DailyEntries::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyEntries::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_entry-user_id")
                            .from(DailyEntries::Table, DailyEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup index for the (user, date) point query. Intentionally not
        // unique: the upsert engine enforces one-entry-per-day itself.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-daily_entries-user_id-date")
                    .table(DailyEntries::Table)
                    .col(DailyEntries::UserId)
                    .col(DailyEntries::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyEntries {
    Table,
    Id,
    UserId,
    Date,
    Text,
    Co2,
    Water,
    Energy,
    Waste,
    Food,
    Points,
    Comment,
    Actions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
