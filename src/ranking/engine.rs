//! Ranking engine
//!
//! One process-wide gate orders everything: `record_donation`,
//! `log_activity` and `rebuild_ranking` hold the write side for their whole
//! upsert -> append -> recompute sequence, readers hold the read side. A
//! reader therefore sees either the complete old ranking or the complete
//! new one.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::index::RankingIndex;
use super::views::{CityContext, CityRanking, CityStatistics, GlobalStatistics, Leaderboard};
use crate::config::RankingConfig;
use crate::errors::{RankingError, Result};
use crate::storage::{
    ActivityLog, ActivityRecord, ActivityType, AggregateStore, CityAggregate, StorageHandles,
};

pub struct RankingEngine {
    aggregates: Arc<dyn AggregateStore>,
    activity: Arc<dyn ActivityLog>,
    index: RankingIndex,
    settings: RankingConfig,
    gate: RwLock<()>,
}

impl RankingEngine {
    pub fn new(storage: StorageHandles, settings: RankingConfig) -> Self {
        Self {
            index: RankingIndex::new(storage.aggregates.clone()),
            aggregates: storage.aggregates,
            activity: storage.activity,
            settings,
            gate: RwLock::new(()),
        }
    }

    /// In-memory engine with default settings
    pub fn in_memory() -> Self {
        Self::new(StorageHandles::in_memory(), RankingConfig::default())
    }

    pub fn settings(&self) -> &RankingConfig {
        &self.settings
    }

    pub fn backend_name(&self) -> &str {
        self.aggregates.backend_name()
    }

    /// Number of cities with at least one donation (bypasses the gate)
    pub async fn city_count(&self) -> Result<u64> {
        self.aggregates.count().await
    }

    // ============================================================
    // Writes
    // ============================================================

    /// Count one completed donation and re-rank every city
    ///
    /// Input is validated before anything is written. If the upsert fails
    /// nothing changed and the call can be retried. If a later step fails the
    /// donation is already counted and the error is `Committed`; the next
    /// donation or `rebuild_ranking` repairs stale ranks.
    pub async fn record_donation(
        &self,
        city: &str,
        amount: f64,
        donor_id: &str,
    ) -> Result<CityRanking> {
        let city = self.validate_city(city)?;
        validate_amount(amount)?;
        self.validate_donor_id(donor_id)?;

        let _guard = self.gate.write().await;

        if let Some(current) = self.aggregates.get(city).await?
            && !(current.total_donated + amount).is_finite()
        {
            return Err(RankingError::invalid_input(format!(
                "donation of {} would overflow the total for '{}'",
                amount, city
            )));
        }

        self.aggregates
            .upsert_donation(city, amount, donor_id)
            .await?;

        // 以下失败均不可重试：捐赠已计入
        let logged = self
            .activity
            .append(donor_id, city, ActivityType::Donation, Some(amount))
            .await;
        if let Err(e) = &logged {
            warn!("Activity append failed for {} (ranking continues): {}", city, e);
        }

        // 活动日志写入失败也要重排，保持排名与聚合一致
        let ranked = self.index.recompute_all().await.map_err(|e| {
            warn!("Ranking pass failed after counting donation to {}: {}", city, e);
            RankingError::committed(format!(
                "donation to '{}' counted but ranking not refreshed: {}",
                city,
                e.message()
            ))
        })?;
        if let Err(e) = logged {
            return Err(RankingError::committed(format!(
                "donation to '{}' counted and ranked but not logged: {}",
                city,
                e.message()
            )));
        }

        let entry = ranked
            .iter()
            .find(|agg| agg.city == city)
            .and_then(CityRanking::from_ranked)
            .ok_or_else(|| {
                RankingError::committed(format!("City '{}' missing after recompute", city))
            })?;

        info!(
            "Donation recorded: {} +{} (total {}, rank {})",
            city, amount, entry.total_donations, entry.rank
        );
        Ok(entry)
    }

    /// Append a non-donation activity; aggregates and ranks are untouched
    pub async fn log_activity(
        &self,
        donor_id: &str,
        city: &str,
        activity_type: ActivityType,
        amount: Option<f64>,
    ) -> Result<ActivityRecord> {
        if activity_type == ActivityType::Donation {
            return Err(RankingError::invalid_input(
                "donations must go through record_donation",
            ));
        }
        let city = self.validate_city(city)?;
        self.validate_donor_id(donor_id)?;
        if let Some(amount) = amount
            && (!amount.is_finite() || amount < 0.0)
        {
            return Err(RankingError::invalid_input(format!(
                "activity amount must be a finite non-negative number, got {}",
                amount
            )));
        }

        let _guard = self.gate.write().await;
        let record = self
            .activity
            .append(donor_id, city, activity_type, amount)
            .await?;
        debug!("Activity {} logged for {}", activity_type, city);
        Ok(record)
    }

    /// Re-rank from whatever aggregates are stored; returns the city count
    pub async fn rebuild_ranking(&self) -> Result<usize> {
        let _guard = self.gate.write().await;
        let ranked = self.index.recompute_all().await?;
        info!("Ranking rebuilt for {} cities", ranked.len());
        Ok(ranked.len())
    }

    // ============================================================
    // Reads
    // ============================================================

    pub async fn top_cities(&self, limit: usize) -> Result<Vec<CityRanking>> {
        let _guard = self.gate.read().await;
        let top = self.index.top_n(limit).await?;
        Ok(CityRanking::project_all(&top))
    }

    /// Rank of `city` and the cities within `radius` ranks of it
    pub async fn city_context(&self, city: &str, radius: u32) -> Result<CityContext> {
        let _guard = self.gate.read().await;
        self.context_unlocked(city, radius).await
    }

    /// `None` when the city has no donations yet
    pub async fn city_statistics(&self, city: &str) -> Result<Option<CityStatistics>> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }

        let _guard = self.gate.read().await;
        let Some(agg) = self.aggregates.get(city).await? else {
            return Ok(None);
        };
        let recent = self
            .activity
            .recent_for_city(city, self.settings.recent_activity_limit)
            .await?;
        Ok(Some(CityStatistics::new(agg, recent)))
    }

    pub async fn global_statistics(&self) -> Result<GlobalStatistics> {
        let _guard = self.gate.read().await;
        let all = self.aggregates.all().await?;

        let total_cities = all.len() as u64;
        let total_donations: f64 = all.iter().map(|agg| agg.total_donated).sum();
        let total_donors = if self.settings.distinct_global_donors {
            self.aggregates.distinct_donor_count().await?
        } else {
            // 按城市累加：同一捐赠者在两个城市会被计两次
            sum_donor_counts(&all)
        };
        let average_donation_per_city = if total_cities == 0 {
            0.0
        } else {
            total_donations / total_cities as f64
        };

        Ok(GlobalStatistics {
            total_cities,
            total_donations,
            total_donors,
            average_donation_per_city,
        })
    }

    /// Top cities and the user's city context under one read snapshot
    pub async fn leaderboard(
        &self,
        city: Option<&str>,
        limit: usize,
        radius: u32,
    ) -> Result<Leaderboard> {
        let _guard = self.gate.read().await;
        let top = self.index.top_n(limit).await?;
        let context = match city {
            Some(city) => self.context_unlocked(city, radius).await?,
            None => CityContext::empty(),
        };

        Ok(Leaderboard {
            top_cities: CityRanking::project_all(&top),
            user_city_context: context.context,
            user_city_rank: context.user_city_rank,
        })
    }

    async fn context_unlocked(&self, city: &str, radius: u32) -> Result<CityContext> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(CityContext::empty());
        }
        let (rank, context) = self.index.context_around(city, radius).await?;
        Ok(CityContext {
            user_city_rank: rank,
            context: CityRanking::project_all(&context),
        })
    }

    // ============================================================
    // Validation
    // ============================================================

    fn validate_city<'a>(&self, city: &'a str) -> Result<&'a str> {
        let city = city.trim();
        if city.is_empty() {
            return Err(RankingError::invalid_input("city must not be empty"));
        }
        if city.chars().count() > self.settings.max_city_length {
            return Err(RankingError::invalid_input(format!(
                "city exceeds {} characters",
                self.settings.max_city_length
            )));
        }
        if city.chars().any(char::is_control) {
            return Err(RankingError::invalid_input(
                "city must not contain control characters",
            ));
        }
        Ok(city)
    }

    fn validate_donor_id(&self, donor_id: &str) -> Result<()> {
        if donor_id.trim().is_empty() {
            return Err(RankingError::invalid_input("donor_id must not be empty"));
        }
        if donor_id.chars().count() > self.settings.max_donor_id_length {
            return Err(RankingError::invalid_input(format!(
                "donor_id exceeds {} characters",
                self.settings.max_donor_id_length
            )));
        }
        if donor_id.chars().any(char::is_control) {
            return Err(RankingError::invalid_input(
                "donor_id must not contain control characters",
            ));
        }
        Ok(())
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(RankingError::invalid_input(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

fn sum_donor_counts(aggregates: &[CityAggregate]) -> u64 {
    aggregates.iter().map(|agg| agg.donor_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.01).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-5.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_city_trims() {
        let engine = RankingEngine::in_memory();
        assert_eq!(engine.validate_city("  Austin ").unwrap(), "Austin");
        assert!(engine.validate_city("   ").is_err());
        assert!(engine.validate_city("Aus\ntin").is_err());
        assert!(engine.validate_city(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_donor_id() {
        let engine = RankingEngine::in_memory();
        assert!(engine.validate_donor_id("donor-42").is_ok());
        assert!(engine.validate_donor_id("").is_err());
        assert!(engine.validate_donor_id(&"d".repeat(65)).is_err());
    }

    #[tokio::test]
    async fn test_running_total_must_stay_finite() {
        let engine = RankingEngine::in_memory();
        engine.record_donation("Austin", 1e308, "d1").await.unwrap();

        let err = engine
            .record_donation("Austin", 1e308, "d2")
            .await
            .unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));

        let stats = engine.city_statistics("Austin").await.unwrap().unwrap();
        assert_eq!(stats.donation_count, 1);
        assert_eq!(stats.total_donations, 1e308);
        assert!(engine.global_statistics().await.unwrap().total_donations.is_finite());
    }

    #[tokio::test]
    async fn test_log_activity_rejects_donation_type() {
        let engine = RankingEngine::in_memory();
        let err = engine
            .log_activity("d1", "Austin", ActivityType::Donation, Some(5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_log_activity_does_not_create_aggregate() {
        let engine = RankingEngine::in_memory();
        engine
            .log_activity("d1", "Austin", ActivityType::CampaignCreated, None)
            .await
            .unwrap();
        assert!(engine.city_statistics("Austin").await.unwrap().is_none());
        assert_eq!(engine.global_statistics().await.unwrap().total_cities, 0);
    }
}
