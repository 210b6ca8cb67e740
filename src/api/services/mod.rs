pub mod health;
pub mod rankings;
pub mod response;

pub use health::{AppStartTime, HealthService, health_routes};
pub use rankings::{RankingService, json_config, query_config, ranking_routes};
pub use response::{ApiResponse, ErrorCode, api_result, error_response, success_response};
