use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{ActivityRecord, CityAggregate};

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRanking {
    pub city: String,
    pub total_donations: f64,
    pub total_donors: u64,
    pub rank: u32,
    pub average_donation: f64,
}

impl CityRanking {
    /// Project a ranked aggregate; unranked aggregates yield `None`
    pub fn from_ranked(agg: &CityAggregate) -> Option<Self> {
        Some(Self {
            city: agg.city.clone(),
            total_donations: agg.total_donated,
            total_donors: agg.donor_count,
            rank: agg.rank?,
            average_donation: agg.average_donation,
        })
    }

    pub(crate) fn project_all(aggregates: &[CityAggregate]) -> Vec<Self> {
        aggregates.iter().filter_map(Self::from_ranked).collect()
    }
}

/// A city's rank and its neighbours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityContext {
    pub user_city_rank: Option<u32>,
    pub context: Vec<CityRanking>,
}

impl CityContext {
    pub fn empty() -> Self {
        Self {
            user_city_rank: None,
            context: Vec::new(),
        }
    }
}

/// 单个城市的完整统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityStatistics {
    pub city: String,
    pub total_donations: f64,
    pub total_donors: u64,
    pub donation_count: u64,
    pub rank: Option<u32>,
    pub average_donation: f64,
    pub last_updated: DateTime<Utc>,
    pub recent_activities: Vec<ActivityRecord>,
}

impl CityStatistics {
    pub(crate) fn new(agg: CityAggregate, recent_activities: Vec<ActivityRecord>) -> Self {
        Self {
            city: agg.city,
            total_donations: agg.total_donated,
            total_donors: agg.donor_count,
            donation_count: agg.donation_count,
            rank: agg.rank,
            average_donation: agg.average_donation,
            last_updated: agg.last_updated,
            recent_activities,
        }
    }
}

/// 全局统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStatistics {
    pub total_cities: u64,
    pub total_donations: f64,
    /// Sum of per-city donor counts unless distinct counting is enabled
    pub total_donors: u64,
    pub average_donation_per_city: f64,
}

/// Top cities plus the requesting user's city context, read in one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub top_cities: Vec<CityRanking>,
    pub user_city_context: Vec<CityRanking>,
    pub user_city_rank: Option<u32>,
}
