//! 用户活动日志表迁移
//!
//! user_activities 为只追加的审计日志，按城市查询最近记录。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserActivities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserActivities::DonorId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserActivities::City)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserActivities::ActivityType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserActivities::Amount).double().null())
                    .col(
                        ColumnDef::new(UserActivities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按城市查询最近活动
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_activities_city_time")
                    .table(UserActivities::Table)
                    .col(UserActivities::City)
                    .col(UserActivities::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 按捐赠者查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_activities_donor_time")
                    .table(UserActivities::Table)
                    .col(UserActivities::DonorId)
                    .col(UserActivities::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_activities_donor_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_activities_city_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(UserActivities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserActivities {
    #[sea_orm(iden = "user_activities")]
    Table,
    Id,
    DonorId,
    City,
    ActivityType,
    Amount,
    CreatedAt,
}
