pub mod city_donor;
pub mod city_ranking;
pub mod user_activity;

pub use city_donor::Entity as CityDonorEntity;
pub use city_ranking::Entity as CityRankingEntity;
pub use user_activity::Entity as UserActivityEntity;
