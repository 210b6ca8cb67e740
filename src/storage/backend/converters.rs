use std::str::FromStr;

use tracing::warn;

use crate::storage::{ActivityRecord, ActivityType, CityAggregate};
use migration::entities::{city_ranking, user_activity};

/// 将 city_rankings 行转换为 CityAggregate
pub fn model_to_aggregate(model: city_ranking::Model) -> CityAggregate {
    CityAggregate {
        city: model.city,
        total_donated: model.total_donations,
        donor_count: model.donor_count.max(0) as u64,
        donation_count: model.donation_count.max(0) as u64,
        rank: model.rank.and_then(|r| u32::try_from(r).ok()).filter(|r| *r > 0),
        average_donation: model.average_donation,
        last_updated: model.last_updated,
    }
}

/// 将 user_activities 行转换为 ActivityRecord
///
/// Unknown type tags (written by a newer version) are skipped.
pub fn model_to_activity(model: user_activity::Model) -> Option<ActivityRecord> {
    let activity_type = match ActivityType::from_str(&model.activity_type) {
        Ok(t) => t,
        Err(_) => {
            warn!(
                "Skipping activity {} with unknown type '{}'",
                model.id, model.activity_type
            );
            return None;
        }
    };

    Some(ActivityRecord {
        id: model.id,
        donor_id: model.donor_id,
        city: model.city,
        activity_type,
        amount: model.amount,
        timestamp: model.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ranking_model(rank: Option<i32>) -> city_ranking::Model {
        city_ranking::Model {
            city: "Austin".to_string(),
            total_donations: 150.0,
            donor_count: 2,
            donation_count: 2,
            rank,
            average_donation: 75.0,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_model_to_aggregate() {
        let agg = model_to_aggregate(ranking_model(Some(2)));
        assert_eq!(agg.city, "Austin");
        assert_eq!(agg.rank, Some(2));
        assert_eq!(agg.donor_count, 2);
        assert_eq!(agg.average_donation, 75.0);
    }

    #[test]
    fn test_non_positive_rank_treated_as_unranked() {
        assert_eq!(model_to_aggregate(ranking_model(Some(0))).rank, None);
        assert_eq!(model_to_aggregate(ranking_model(None)).rank, None);
    }

    #[test]
    fn test_unknown_activity_type_skipped() {
        let model = user_activity::Model {
            id: 1,
            donor_id: "d1".to_string(),
            city: "Austin".to_string(),
            activity_type: "refund".to_string(),
            amount: Some(1.0),
            created_at: Utc::now(),
        };
        assert!(model_to_activity(model).is_none());
    }
}
