//! Initial migration: ranking and daily activity tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_top_repositories(manager).await?;
        self.create_daily_activity(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyActivity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TopRepositories::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_top_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TopRepositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TopRepositories::FullName)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TopRepositories::Owner).string().not_null())
                    .col(ColumnDef::new(TopRepositories::Name).string().not_null())
                    // Ranking
                    .col(
                        ColumnDef::new(TopRepositories::PositionCurrent)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TopRepositories::PositionPrevious)
                            .integer()
                            .null(),
                    )
                    // Statistics
                    .col(
                        ColumnDef::new(TopRepositories::Stars)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TopRepositories::Watchers)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TopRepositories::Forks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TopRepositories::OpenIssues)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TopRepositories::Language).string().null())
                    // Tracking
                    .col(
                        ColumnDef::new(TopRepositories::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_top_repos_position")
                    .table(TopRepositories::Table)
                    .col(TopRepositories::PositionCurrent)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_top_repos_stars")
                    .table(TopRepositories::Table)
                    .col((TopRepositories::Stars, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_daily_activity(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyActivity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyActivity::Owner).string().not_null())
                    .col(ColumnDef::new(DailyActivity::Repo).string().not_null())
                    .col(ColumnDef::new(DailyActivity::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyActivity::Commits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::Authors)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_daily_activity")
                            .col(DailyActivity::Owner)
                            .col(DailyActivity::Repo)
                            .col(DailyActivity::Date),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "top_repositories")]
enum TopRepositories {
    Table,
    FullName,
    Owner,
    Name,
    PositionCurrent,
    PositionPrevious,
    Stars,
    Watchers,
    Forks,
    OpenIssues,
    Language,
    SyncedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "daily_activity")]
enum DailyActivity {
    Table,
    Owner,
    Repo,
    Date,
    Commits,
    Authors,
}
