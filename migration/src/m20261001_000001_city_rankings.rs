//! 城市排名表迁移
//!
//! 创建两张表：
//! - city_rankings: 每个城市一行的捐赠聚合（总额、捐赠次数、排名、均值）
//! - city_donors: 城市与捐赠者的去重关系，用于计算 donor_count

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CityRankings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CityRankings::City)
                            .string_len(100)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CityRankings::TotalDonations)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(CityRankings::DonorCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CityRankings::DonationCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CityRankings::Rank).integer().null())
                    .col(
                        ColumnDef::new(CityRankings::AverageDonation)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(CityRankings::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 排名区间查询（top N / context window）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_city_rankings_rank")
                    .table(CityRankings::Table)
                    .col(CityRankings::Rank)
                    .to_owned(),
            )
            .await?;

        // 排序扫描：total 降序 + city 升序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_city_rankings_total_city")
                    .table(CityRankings::Table)
                    .col((CityRankings::TotalDonations, IndexOrder::Desc))
                    .col(CityRankings::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CityDonors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CityDonors::City).string_len(100).not_null())
                    .col(ColumnDef::new(CityDonors::DonorId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(CityDonors::FirstSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CityDonors::City)
                            .col(CityDonors::DonorId),
                    )
                    .to_owned(),
            )
            .await?;

        // 全局去重捐赠者统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_city_donors_donor_id")
                    .table(CityDonors::Table)
                    .col(CityDonors::DonorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_city_donors_donor_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CityDonors::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_city_rankings_total_city")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_city_rankings_rank").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CityRankings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CityRankings {
    #[sea_orm(iden = "city_rankings")]
    Table,
    City,
    TotalDonations,
    DonorCount,
    DonationCount,
    Rank,
    AverageDonation,
    LastUpdated,
}

#[derive(DeriveIden)]
enum CityDonors {
    #[sea_orm(iden = "city_donors")]
    Table,
    City,
    DonorId,
    FirstSeen,
}
