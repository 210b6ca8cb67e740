//! Per-city donation aggregate

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "city_rankings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub city: String,
    #[sea_orm(column_type = "Double")]
    pub total_donations: f64,
    pub donor_count: i64,
    pub donation_count: i64,
    /// Dense rank, NULL until the first ranking pass that sees this city
    pub rank: Option<i32>,
    #[sea_orm(column_type = "Double")]
    pub average_donation: f64,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
