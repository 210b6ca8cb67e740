//! Ranking index
//!
//! Every recompute is a full re-sort: O(N log N) to order the cities plus
//! O(N) rank writes. It runs after every donation, so the city count is
//! expected to stay in the thousands.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::storage::{AggregateStore, CityAggregate, RankUpdate};

/// Rank order: total descending, then city name ascending (byte-wise)
pub fn compare_for_rank(a: &CityAggregate, b: &CityAggregate) -> Ordering {
    b.total_donated
        .total_cmp(&a.total_donated)
        .then_with(|| a.city.as_bytes().cmp(b.city.as_bytes()))
}

/// Sort `aggregates` into rank order and assign dense ranks 1..=N
///
/// Averages are refreshed at the same time. Returns the write-back batch.
pub fn assign_ranks(aggregates: &mut [CityAggregate]) -> Vec<RankUpdate> {
    aggregates.sort_unstable_by(compare_for_rank);

    aggregates
        .iter_mut()
        .enumerate()
        .map(|(i, agg)| {
            let rank = u32::try_from(i + 1).unwrap_or(u32::MAX);
            agg.rank = Some(rank);
            agg.average_donation = agg.computed_average();
            RankUpdate {
                city: agg.city.clone(),
                rank,
                average_donation: agg.average_donation,
            }
        })
        .collect()
}

/// Derives and reads the dense rank ordering stored in an [`AggregateStore`]
#[derive(Clone)]
pub struct RankingIndex {
    store: Arc<dyn AggregateStore>,
}

impl RankingIndex {
    pub fn new(store: Arc<dyn AggregateStore>) -> Self {
        Self { store }
    }

    /// Rank `aggregates` and commit ranks/averages back to the store
    pub async fn recompute(&self, mut aggregates: Vec<CityAggregate>) -> Result<Vec<CityAggregate>> {
        let updates = assign_ranks(&mut aggregates);
        self.store.commit_ranking(&updates).await?;
        debug!("Ranking recomputed for {} cities", updates.len());
        Ok(aggregates)
    }

    /// Load the full aggregate set and recompute
    pub async fn recompute_all(&self) -> Result<Vec<CityAggregate>> {
        let aggregates = self.store.all().await?;
        self.recompute(aggregates).await
    }

    /// First `n` cities by rank; `n == 0` returns empty
    pub async fn top_n(&self, n: usize) -> Result<Vec<CityAggregate>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let end = u32::try_from(n).unwrap_or(u32::MAX);
        self.store.rank_range(1, end).await
    }

    /// Cities ranked within `radius` of `city`, plus the city's own rank
    ///
    /// An unknown (or not yet ranked) city yields `(None, [])`.
    pub async fn context_around(
        &self,
        city: &str,
        radius: u32,
    ) -> Result<(Option<u32>, Vec<CityAggregate>)> {
        let Some(rank) = self.store.get(city).await?.and_then(|agg| agg.rank) else {
            return Ok((None, Vec::new()));
        };

        let start = rank.saturating_sub(radius).max(1);
        let end = rank.saturating_add(radius);
        let context = self.store.rank_range(start, end).await?;
        Ok((Some(rank), context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryAggregateStore;
    use chrono::Utc;

    fn agg(city: &str, total: f64, donations: u64) -> CityAggregate {
        let mut a = CityAggregate::new(city, Utc::now());
        a.total_donated = total;
        a.donation_count = donations;
        a.donor_count = donations;
        a
    }

    #[test]
    fn test_assign_ranks_orders_by_total_desc() {
        let mut aggs = vec![agg("A", 10.0, 1), agg("B", 30.0, 3), agg("C", 20.0, 4)];
        let updates = assign_ranks(&mut aggs);

        let order: Vec<_> = aggs.iter().map(|a| (a.city.as_str(), a.rank)).collect();
        assert_eq!(order, vec![("B", Some(1)), ("C", Some(2)), ("A", Some(3))]);
        assert_eq!(updates[1].average_donation, 5.0);
    }

    #[test]
    fn test_ties_broken_by_city_name() {
        let mut aggs = vec![agg("Denver", 50.0, 1), agg("Austin", 50.0, 1), agg("Chicago", 50.0, 1)];
        assign_ranks(&mut aggs);
        let cities: Vec<_> = aggs.iter().map(|a| a.city.as_str()).collect();
        assert_eq!(cities, vec!["Austin", "Chicago", "Denver"]);
        let ranks: Vec<_> = aggs.iter().filter_map(|a| a.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_tie_break_is_bytewise() {
        // 大写字母排在小写之前
        let mut aggs = vec![agg("austin", 5.0, 1), agg("Boston", 5.0, 1)];
        assign_ranks(&mut aggs);
        assert_eq!(aggs[0].city, "Boston");
    }

    #[test]
    fn test_assign_ranks_empty() {
        let mut aggs: Vec<CityAggregate> = Vec::new();
        assert!(assign_ranks(&mut aggs).is_empty());
    }

    #[tokio::test]
    async fn test_context_clipped_at_rank_one() {
        let store = Arc::new(MemoryAggregateStore::new());
        for (i, city) in ["A", "B", "C", "D", "E", "F", "G", "H"].iter().enumerate() {
            store
                .upsert_donation(city, 100.0 - i as f64, "d")
                .await
                .unwrap();
        }
        let index = RankingIndex::new(store);
        index.recompute_all().await.unwrap();

        let (rank, context) = index.context_around("B", 3).await.unwrap();
        assert_eq!(rank, Some(2));
        let ranks: Vec<_> = context.iter().filter_map(|a| a.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);

        let (rank, context) = index.context_around("H", 1).await.unwrap();
        assert_eq!(rank, Some(8));
        assert_eq!(context.len(), 2);
    }

    #[tokio::test]
    async fn test_top_n_zero_and_oversized() {
        let store = Arc::new(MemoryAggregateStore::new());
        store.upsert_donation("A", 1.0, "d").await.unwrap();
        let index = RankingIndex::new(store);
        index.recompute_all().await.unwrap();

        assert!(index.top_n(0).await.unwrap().is_empty());
        assert_eq!(index.top_n(50).await.unwrap().len(), 1);
    }
}
