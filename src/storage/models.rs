use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 单个城市的捐赠聚合
///
/// `donor_count` is the size of the city's distinct donor set; the set itself
/// stays inside the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    pub city: String,
    pub total_donated: f64,
    pub donor_count: u64,
    pub donation_count: u64,
    /// Dense rank, `None` until a ranking pass has seen this city
    pub rank: Option<u32>,
    pub average_donation: f64,
    pub last_updated: DateTime<Utc>,
}

impl CityAggregate {
    /// Empty aggregate for a city seen for the first time
    pub fn new(city: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            city: city.into(),
            total_donated: 0.0,
            donor_count: 0,
            donation_count: 0,
            rank: None,
            average_donation: 0.0,
            last_updated: now,
        }
    }

    /// total_donated / donation_count, 0 when no donations
    pub fn computed_average(&self) -> f64 {
        if self.donation_count == 0 {
            0.0
        } else {
            self.total_donated / self.donation_count as f64
        }
    }
}

/// 排名回写条目
#[derive(Debug, Clone, PartialEq)]
pub struct RankUpdate {
    pub city: String,
    pub rank: u32,
    pub average_donation: f64,
}

/// 活动类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityType {
    Donation,
    CampaignCreated,
    Registration,
}

/// 活动日志记录（写入后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub donor_id: String,
    pub city: String,
    pub activity_type: ActivityType,
    pub amount: Option<f64>,
    pub timestamp: DateTime<Utc>,
}
