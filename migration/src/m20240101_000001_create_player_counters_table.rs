use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerCounters::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlayerCounters::Profile).string().not_null())
                    .col(ColumnDef::new(PlayerCounters::CounterKey).string().not_null())
                    .col(
                        ColumnDef::new(PlayerCounters::Value)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayerCounters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PlayerCounters::Profile)
                            .col(PlayerCounters::CounterKey),
                    )
                    .to_owned(),
            )
            .await?;

        // Profile lookups load every counter at session start
        manager
            .create_index(
                Index::create()
                    .name("idx_player_counters_profile")
                    .table(PlayerCounters::Table)
                    .col(PlayerCounters::Profile)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerCounters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayerCounters {
    Table,
    Profile,
    CounterKey,
    Value,
    UpdatedAt,
}
