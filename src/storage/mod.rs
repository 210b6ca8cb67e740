//! Storage contracts and backends
//!
//! The ranking engine only talks to the [`AggregateStore`] and [`ActivityLog`]
//! traits. Two families of backends implement them:
//! - `memory`: DashMap / mutex backed, used for tests and `memory://` URLs
//! - `backend`: SeaORM (SQLite, MySQL/MariaDB, PostgreSQL)

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::{MemoryActivityLog, MemoryAggregateStore};
pub use models::{ActivityRecord, ActivityType, CityAggregate, RankUpdate};

/// Durable per-city counters
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Add one donation to `city`, creating the aggregate on first use.
    ///
    /// Must be atomic per city. Re-adding a known donor leaves `donor_count`
    /// unchanged. Returns the aggregate as written.
    async fn upsert_donation(&self, city: &str, amount: f64, donor_id: &str)
    -> Result<CityAggregate>;

    async fn get(&self, city: &str) -> Result<Option<CityAggregate>>;

    /// All aggregates, unordered
    async fn all(&self) -> Result<Vec<CityAggregate>>;

    async fn count(&self) -> Result<u64>;

    /// Write back ranks and averages produced by a ranking pass
    async fn commit_ranking(&self, updates: &[RankUpdate]) -> Result<()>;

    /// Aggregates with `start <= rank <= end`, ordered by rank ascending
    async fn rank_range(&self, start: u32, end: u32) -> Result<Vec<CityAggregate>>;

    /// Distinct donors across every city
    async fn distinct_donor_count(&self) -> Result<u64>;

    fn backend_name(&self) -> &str;
}

/// Append-only activity trail
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn append(
        &self,
        donor_id: &str,
        city: &str,
        activity_type: ActivityType,
        amount: Option<f64>,
    ) -> Result<ActivityRecord>;

    /// Up to `limit` records for `city`, newest first
    async fn recent_for_city(&self, city: &str, limit: usize) -> Result<Vec<ActivityRecord>>;
}

/// 一组配套的存储实现
#[derive(Clone)]
pub struct StorageHandles {
    pub aggregates: Arc<dyn AggregateStore>,
    pub activity: Arc<dyn ActivityLog>,
}

impl StorageHandles {
    pub fn in_memory() -> Self {
        Self {
            aggregates: Arc::new(MemoryAggregateStore::new()),
            activity: Arc::new(MemoryActivityLog::new()),
        }
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<StorageHandles> {
        let database_url = &config.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        if backend_type == "memory" {
            info!("Using in-memory ranking storage (data is not persisted)");
            return Ok(StorageHandles::in_memory());
        }

        let storage = Arc::new(SeaOrmStorage::new(config, &backend_type).await?);
        Ok(StorageHandles {
            aggregates: storage.clone(),
            activity: storage,
        })
    }
}
