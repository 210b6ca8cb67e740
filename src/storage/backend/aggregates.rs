//! AggregateStore implementation for SeaOrmStorage

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{CaseStatement, Expr, OnConflict, Query};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, trace};

use super::SeaOrmStorage;
use super::converters::model_to_aggregate;
use super::retry;
use crate::errors::{RankingError, Result};
use crate::storage::{AggregateStore, CityAggregate, RankUpdate};

use migration::entities::{city_donor, city_ranking};

/// 单条 UPDATE ... CASE 语句最多包含的城市数
const RANK_UPDATE_CHUNK: usize = 500;

#[async_trait]
impl AggregateStore for SeaOrmStorage {
    async fn upsert_donation(
        &self,
        city: &str,
        amount: f64,
        donor_id: &str,
    ) -> Result<CityAggregate> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("upsert_donation({})", city),
            self.retry_config,
            || async {
                let now = Utc::now();
                let txn = db.begin().await?;

                // 1. 首次出现的城市先插入零值行
                city_ranking::Entity::insert(city_ranking::ActiveModel {
                    city: Set(city.to_string()),
                    total_donations: Set(0.0),
                    donor_count: Set(0),
                    donation_count: Set(0),
                    rank: Set(None),
                    average_donation: Set(0.0),
                    last_updated: Set(now),
                })
                .on_conflict(
                    OnConflict::column(city_ranking::Column::City)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;

                // 2. 捐赠者去重：插入成功即为新捐赠者
                let new_donor = city_donor::Entity::insert(city_donor::ActiveModel {
                    city: Set(city.to_string()),
                    donor_id: Set(donor_id.to_string()),
                    first_seen: Set(now),
                })
                .on_conflict(
                    OnConflict::columns([city_donor::Column::City, city_donor::Column::DonorId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?
                    > 0;

                // 3. 原子自增；右侧表达式都引用更新前的值
                city_ranking::Entity::update_many()
                    .col_expr(
                        city_ranking::Column::TotalDonations,
                        Expr::col(city_ranking::Column::TotalDonations).add(amount),
                    )
                    .col_expr(
                        city_ranking::Column::DonationCount,
                        Expr::col(city_ranking::Column::DonationCount).add(1i64),
                    )
                    .col_expr(
                        city_ranking::Column::DonorCount,
                        Expr::col(city_ranking::Column::DonorCount).add(i64::from(new_donor)),
                    )
                    .col_expr(
                        city_ranking::Column::AverageDonation,
                        Expr::col(city_ranking::Column::TotalDonations)
                            .add(amount)
                            .div(Expr::col(city_ranking::Column::DonationCount).add(1i64)),
                    )
                    .col_expr(city_ranking::Column::LastUpdated, Expr::val(now).into())
                    .filter(city_ranking::Column::City.eq(city))
                    .exec(&txn)
                    .await?;

                let model = city_ranking::Entity::find_by_id(city.to_string())
                    .one(&txn)
                    .await?
                    .ok_or_else(|| sea_orm::DbErr::RecordNotFound(city.to_string()))?;

                txn.commit().await?;
                Ok(model)
            },
        )
        .await
        .map_err(|e| {
            RankingError::storage_failure(format!("Failed to record donation for '{}': {}", city, e))
        })?;

        trace!(
            "upsert_donation: {} -> total={}, donations={}",
            model.city, model.total_donations, model.donation_count
        );
        Ok(model_to_aggregate(model))
    }

    async fn get(&self, city: &str) -> Result<Option<CityAggregate>> {
        let db = &self.db;
        let city_owned = city.to_string();

        let model = retry::with_retry(&format!("get({})", city), self.retry_config, || async {
            city_ranking::Entity::find_by_id(city_owned.clone())
                .one(db)
                .await
        })
        .await
        .map_err(|e| RankingError::storage_failure(format!("Failed to load '{}': {}", city, e)))?;

        Ok(model.map(model_to_aggregate))
    }

    async fn all(&self) -> Result<Vec<CityAggregate>> {
        let db = &self.db;
        let models = retry::with_retry("load_all_cities", self.retry_config, || async {
            city_ranking::Entity::find().all(db).await
        })
        .await
        .map_err(|e| RankingError::storage_failure(format!("Failed to load cities: {}", e)))?;

        Ok(models.into_iter().map(model_to_aggregate).collect())
    }

    async fn count(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("count_cities", self.retry_config, || async {
            city_ranking::Entity::find().count(db).await
        })
        .await
        .map_err(|e| RankingError::storage_failure(format!("Failed to count cities: {}", e)))
    }

    async fn commit_ranking(&self, updates: &[RankUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        // 构建 CASE WHEN 批量更新语句（跨平台兼容）
        let statements: Vec<_> = updates
            .chunks(RANK_UPDATE_CHUNK)
            .map(|chunk| {
                let mut rank_case = CaseStatement::new();
                let mut average_case = CaseStatement::new();
                let mut cities: Vec<String> = Vec::with_capacity(chunk.len());

                for update in chunk {
                    let is_city =
                        Expr::col(city_ranking::Column::City).eq(Expr::val(update.city.as_str()));
                    rank_case = rank_case.case(is_city.clone(), Expr::val(update.rank as i32));
                    average_case = average_case.case(is_city, Expr::val(update.average_donation));
                    cities.push(update.city.clone());
                }
                // 不匹配的保持原值
                rank_case = rank_case.finally(Expr::col(city_ranking::Column::Rank));
                average_case =
                    average_case.finally(Expr::col(city_ranking::Column::AverageDonation));

                Query::update()
                    .table(city_ranking::Entity)
                    .value(city_ranking::Column::Rank, rank_case)
                    .value(city_ranking::Column::AverageDonation, average_case)
                    .and_where(Expr::col(city_ranking::Column::City).is_in(cities))
                    .to_owned()
            })
            .collect();

        let db = &self.db;
        let statements_ref = &statements;
        retry::with_retry("commit_ranking", self.retry_config, || async {
            let txn = db.begin().await?;
            for stmt in statements_ref {
                txn.execute(stmt).await?;
            }
            txn.commit().await
        })
        .await
        .map_err(|e| {
            RankingError::storage_failure(format!("Failed to write back ranking: {}", e))
        })?;

        debug!(
            "Ranking written to {} database ({} cities, {} statements)",
            self.backend_name.to_uppercase(),
            updates.len(),
            statements.len()
        );
        Ok(())
    }

    async fn rank_range(&self, start: u32, end: u32) -> Result<Vec<CityAggregate>> {
        if start > end {
            return Ok(Vec::new());
        }

        let db = &self.db;
        let start = i32::try_from(start).unwrap_or(i32::MAX);
        let end = i32::try_from(end).unwrap_or(i32::MAX);

        let models = retry::with_retry("rank_range", self.retry_config, || async {
            city_ranking::Entity::find()
                .filter(city_ranking::Column::Rank.between(start, end))
                .order_by_asc(city_ranking::Column::Rank)
                .all(db)
                .await
        })
        .await
        .map_err(|e| RankingError::storage_failure(format!("Failed to load rank range: {}", e)))?;

        Ok(models.into_iter().map(model_to_aggregate).collect())
    }

    async fn distinct_donor_count(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("distinct_donor_count", self.retry_config, || async {
            city_donor::Entity::find()
                .select_only()
                .column(city_donor::Column::DonorId)
                .distinct()
                .count(db)
                .await
        })
        .await
        .map_err(|e| RankingError::storage_failure(format!("Failed to count donors: {}", e)))
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
