//! In-memory storage backends
//!
//! `MemoryAggregateStore` keeps one DashMap entry per city; the entry guard
//! makes each upsert atomic for its city while other cities proceed in
//! parallel. `MemoryActivityLog` appends under a single mutex so ids and
//! timestamps follow append order.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::trace;

use super::models::{ActivityRecord, ActivityType, CityAggregate, RankUpdate};
use super::{ActivityLog, AggregateStore};
use crate::errors::Result;

struct CityEntry {
    aggregate: CityAggregate,
    donors: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryAggregateStore {
    cities: DashMap<String, CityEntry>,
}

impl MemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AggregateStore for MemoryAggregateStore {
    async fn upsert_donation(
        &self,
        city: &str,
        amount: f64,
        donor_id: &str,
    ) -> Result<CityAggregate> {
        let now = Utc::now();
        let mut entry = self
            .cities
            .entry(city.to_string())
            .or_insert_with(|| CityEntry {
                aggregate: CityAggregate::new(city, now),
                donors: HashSet::new(),
            });

        let entry = entry.value_mut();
        entry.donors.insert(donor_id.to_string());
        let donor_count = entry.donors.len() as u64;

        let agg = &mut entry.aggregate;
        agg.total_donated += amount;
        agg.donation_count += 1;
        agg.donor_count = donor_count;
        agg.average_donation = agg.computed_average();
        agg.last_updated = now;

        trace!(
            "MemoryAggregateStore: {} -> total={}, donations={}",
            city, agg.total_donated, agg.donation_count
        );
        Ok(agg.clone())
    }

    async fn get(&self, city: &str) -> Result<Option<CityAggregate>> {
        Ok(self.cities.get(city).map(|e| e.aggregate.clone()))
    }

    async fn all(&self) -> Result<Vec<CityAggregate>> {
        Ok(self
            .cities
            .iter()
            .map(|e| e.value().aggregate.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.cities.len() as u64)
    }

    async fn commit_ranking(&self, updates: &[RankUpdate]) -> Result<()> {
        for update in updates {
            if let Some(mut entry) = self.cities.get_mut(&update.city) {
                entry.aggregate.rank = Some(update.rank);
                entry.aggregate.average_donation = update.average_donation;
            }
        }
        Ok(())
    }

    async fn rank_range(&self, start: u32, end: u32) -> Result<Vec<CityAggregate>> {
        let mut ranked: Vec<CityAggregate> = self
            .cities
            .iter()
            .filter(|e| {
                e.aggregate
                    .rank
                    .is_some_and(|rank| rank >= start && rank <= end)
            })
            .map(|e| e.aggregate.clone())
            .collect();
        ranked.sort_by_key(|a| a.rank);
        Ok(ranked)
    }

    async fn distinct_donor_count(&self) -> Result<u64> {
        let mut donors: HashSet<String> = HashSet::new();
        for entry in self.cities.iter() {
            donors.extend(entry.donors.iter().cloned());
        }
        Ok(donors.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[derive(Default)]
struct LogState {
    next_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
    by_city: HashMap<String, Vec<ActivityRecord>>,
}

#[derive(Default)]
pub struct MemoryActivityLog {
    state: Mutex<LogState>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all cities
    pub fn len(&self) -> usize {
        self.state.lock().by_city.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn append(
        &self,
        donor_id: &str,
        city: &str,
        activity_type: ActivityType,
        amount: Option<f64>,
    ) -> Result<ActivityRecord> {
        let mut state = self.state.lock();

        // 时间戳不回退，保证追加顺序即时间顺序
        let now = Utc::now();
        let timestamp = match state.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        state.last_timestamp = Some(timestamp);
        state.next_id += 1;

        let record = ActivityRecord {
            id: state.next_id,
            donor_id: donor_id.to_string(),
            city: city.to_string(),
            activity_type,
            amount,
            timestamp,
        };
        state
            .by_city
            .entry(city.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn recent_for_city(&self, city: &str, limit: usize) -> Result<Vec<ActivityRecord>> {
        let state = self.state.lock();
        Ok(state
            .by_city
            .get(city)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_creates_then_increments() {
        let store = MemoryAggregateStore::new();

        let first = store.upsert_donation("Austin", 100.0, "d1").await.unwrap();
        assert_eq!(first.total_donated, 100.0);
        assert_eq!(first.donor_count, 1);
        assert_eq!(first.donation_count, 1);
        assert_eq!(first.rank, None);

        let second = store.upsert_donation("Austin", 50.0, "d2").await.unwrap();
        assert_eq!(second.total_donated, 150.0);
        assert_eq!(second.donor_count, 2);
        assert_eq!(second.donation_count, 2);
        assert_eq!(second.average_donation, 75.0);
        assert!(second.last_updated >= first.last_updated);
    }

    #[tokio::test]
    async fn test_repeat_donor_not_double_counted() {
        let store = MemoryAggregateStore::new();
        store.upsert_donation("Austin", 10.0, "d1").await.unwrap();
        let agg = store.upsert_donation("Austin", 20.0, "d1").await.unwrap();
        assert_eq!(agg.donor_count, 1);
        assert_eq!(agg.donation_count, 2);
        assert_eq!(agg.total_donated, 30.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_upserts_to_one_city_are_exact() {
        let store = std::sync::Arc::new(MemoryAggregateStore::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert_donation("Austin", 1.5, &format!("d{}", i % 16))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let agg = store.get("Austin").await.unwrap().unwrap();
        assert_eq!(agg.donation_count, 64);
        assert_eq!(agg.total_donated, 96.0);
        assert_eq!(agg.donor_count, 16);
        assert_eq!(agg.average_donation, 1.5);
    }

    #[tokio::test]
    async fn test_rank_range_ignores_unranked() {
        let store = MemoryAggregateStore::new();
        store.upsert_donation("A", 1.0, "d").await.unwrap();
        store.upsert_donation("B", 2.0, "d").await.unwrap();
        store
            .commit_ranking(&[RankUpdate {
                city: "B".into(),
                rank: 1,
                average_donation: 2.0,
            }])
            .await
            .unwrap();

        let ranked = store.rank_range(1, 10).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].city, "B");
    }

    #[tokio::test]
    async fn test_distinct_donor_count_across_cities() {
        let store = MemoryAggregateStore::new();
        store.upsert_donation("A", 1.0, "d1").await.unwrap();
        store.upsert_donation("B", 1.0, "d1").await.unwrap();
        store.upsert_donation("B", 1.0, "d2").await.unwrap();
        assert_eq!(store.distinct_donor_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_activity_log_newest_first_with_limit() {
        let log = MemoryActivityLog::new();
        for i in 0..5 {
            log.append("d1", "Austin", ActivityType::Donation, Some(i as f64))
                .await
                .unwrap();
        }
        log.append("d2", "Boston", ActivityType::Registration, None)
            .await
            .unwrap();

        let recent = log.recent_for_city("Austin", 3).await.unwrap();
        let amounts: Vec<_> = recent.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![Some(4.0), Some(3.0), Some(2.0)]);
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(log.len(), 6);
        assert!(log.recent_for_city("Nowhere", 10).await.unwrap().is_empty());
    }
}
