use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChallengeCompletions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChallengeCompletions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChallengeCompletions::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChallengeCompletions::ChallengeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChallengeCompletions::Points)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChallengeCompletions::CompletedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-challenge_completion-user_id")
                            .from(ChallengeCompletions::Table, ChallengeCompletions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChallengeCompletions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChallengeCompletions {
    Table,
    Id,
    UserId,
    ChallengeId,
    Points,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
