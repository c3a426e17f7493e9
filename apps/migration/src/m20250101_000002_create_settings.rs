use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    PostFrequency,
    PreferredTime,
    Timezone,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Settings::Id).integer().not_null().primary_key())
                    .col(
                        ColumnDef::new(Settings::PostFrequency)
                            .string_len(32)
                            .not_null()
                            .default("daily"),
                    )
                    .col(
                        ColumnDef::new(Settings::PreferredTime)
                            .string_len(5)
                            .not_null()
                            .default("14:00"),
                    )
                    .col(
                        ColumnDef::new(Settings::Timezone)
                            .string_len(64)
                            .not_null()
                            .default("America/New_York"),
                    )
                    // Singleton row
                    .check(Expr::col(Settings::Id).eq(1))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}
