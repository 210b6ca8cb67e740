//! ActivityLog implementation for SeaOrmStorage

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use tracing::trace;

use super::SeaOrmStorage;
use super::converters::model_to_activity;
use super::retry;
use crate::errors::{RankingError, Result};
use crate::storage::{ActivityLog, ActivityRecord, ActivityType};

use migration::entities::user_activity;

#[async_trait]
impl ActivityLog for SeaOrmStorage {
    async fn append(
        &self,
        donor_id: &str,
        city: &str,
        activity_type: ActivityType,
        amount: Option<f64>,
    ) -> Result<ActivityRecord> {
        let db = &self.db;
        let now = Utc::now();

        let model = retry::with_retry("append_activity", self.retry_config, || async {
            user_activity::ActiveModel {
                id: NotSet,
                donor_id: Set(donor_id.to_string()),
                city: Set(city.to_string()),
                activity_type: Set(activity_type.as_ref().to_string()),
                amount: Set(amount),
                created_at: Set(now),
            }
            .insert(db)
            .await
        })
        .await
        .map_err(|e| {
            RankingError::storage_failure(format!("Failed to append activity for '{}': {}", city, e))
        })?;

        trace!("Activity {} appended ({} in {})", model.id, activity_type, city);
        Ok(ActivityRecord {
            id: model.id,
            donor_id: model.donor_id,
            city: model.city,
            activity_type,
            amount: model.amount,
            timestamp: model.created_at,
        })
    }

    async fn recent_for_city(&self, city: &str, limit: usize) -> Result<Vec<ActivityRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let db = &self.db;
        let models = retry::with_retry("recent_for_city", self.retry_config, || async {
            user_activity::Entity::find()
                .filter(user_activity::Column::City.eq(city))
                .order_by_desc(user_activity::Column::CreatedAt)
                .order_by_desc(user_activity::Column::Id)
                .limit(limit as u64)
                .all(db)
                .await
        })
        .await
        .map_err(|e| {
            RankingError::storage_failure(format!("Failed to load activity for '{}': {}", city, e))
        })?;

        Ok(models.into_iter().filter_map(model_to_activity).collect())
    }
}
