//! Ranking HTTP handlers
//!
//! Thin adapters: parse the request, call the engine, wrap the result in
//! the `{code, message, data}` envelope.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{info, trace};

use super::response::{ErrorCode, api_result, error_response, success_response};
use crate::errors::RankingError;
use crate::ranking::RankingEngine;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordDonationRequest {
    pub city: String,
    pub amount: f64,
    pub donor_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub city: Option<String>,
    pub limit: Option<i64>,
    pub radius: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextQuery {
    pub radius: Option<i64>,
}

/// 负数视为 0
fn clamp_limit(value: Option<i64>, default: usize) -> usize {
    match value {
        Some(v) => usize::try_from(v.max(0)).unwrap_or(usize::MAX),
        None => default,
    }
}

fn clamp_radius(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) => u32::try_from(v.max(0)).unwrap_or(u32::MAX),
        None => default,
    }
}

pub struct RankingService;

impl RankingService {
    pub async fn record_donation(
        engine: web::Data<Arc<RankingEngine>>,
        body: web::Json<RecordDonationRequest>,
    ) -> impl Responder {
        let req = body.into_inner();
        trace!("Record donation request: {:?}", req);
        api_result(
            engine
                .record_donation(&req.city, req.amount, &req.donor_id)
                .await,
        )
    }

    pub async fn leaderboard(
        engine: web::Data<Arc<RankingEngine>>,
        query: web::Query<LeaderboardQuery>,
    ) -> impl Responder {
        let settings = engine.settings();
        let limit = clamp_limit(query.limit, settings.top_limit);
        let radius = clamp_radius(query.radius, settings.context_radius);
        api_result(
            engine
                .leaderboard(query.city.as_deref(), limit, radius)
                .await,
        )
    }

    pub async fn top_cities(
        engine: web::Data<Arc<RankingEngine>>,
        query: web::Query<TopQuery>,
    ) -> impl Responder {
        let limit = clamp_limit(query.limit, engine.settings().top_limit);
        api_result(engine.top_cities(limit).await)
    }

    pub async fn city_statistics(
        engine: web::Data<Arc<RankingEngine>>,
        path: web::Path<String>,
    ) -> impl Responder {
        let city = path.into_inner();
        match engine.city_statistics(&city).await {
            Ok(Some(stats)) => success_response(stats),
            Ok(None) => error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::CityNotFound,
                &format!("No donations recorded for city '{}'", city),
            ),
            Err(e) => api_result::<(), RankingError>(Err(e)),
        }
    }

    pub async fn city_context(
        engine: web::Data<Arc<RankingEngine>>,
        path: web::Path<String>,
        query: web::Query<ContextQuery>,
    ) -> impl Responder {
        let radius = clamp_radius(query.radius, engine.settings().context_radius);
        api_result(engine.city_context(&path.into_inner(), radius).await)
    }

    pub async fn global_statistics(engine: web::Data<Arc<RankingEngine>>) -> impl Responder {
        api_result(engine.global_statistics().await)
    }

    pub async fn rebuild(engine: web::Data<Arc<RankingEngine>>) -> HttpResponse {
        let result = engine.rebuild_ranking().await;
        if let Ok(count) = &result {
            info!("Ranking rebuild requested over HTTP ({} cities)", count);
        }
        api_result(result.map(|cities| serde_json::json!({ "ranked_cities": cities })))
    }
}

/// Ranking 路由配置
///
/// `/city-rankings/top` is registered before `/city-rankings/{city}`, so a
/// city literally named "top" is only reachable via the context route.
pub fn ranking_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/donations/record",
        web::post().to(RankingService::record_donation),
    )
    .service(
        web::scope("/city-rankings")
            .route("", web::get().to(RankingService::leaderboard))
            .route("/top", web::get().to(RankingService::top_cities))
            .route("/{city}", web::get().to(RankingService::city_statistics))
            .route("/{city}/context", web::get().to(RankingService::city_context)),
    )
    .route(
        "/global-statistics",
        web::get().to(RankingService::global_statistics),
    )
    .route("/rankings/rebuild", web::post().to(RankingService::rebuild));
}

/// JSON / Query 解析失败时同样返回统一信封
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
            )
            .into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
        )
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 3), 3);
        assert_eq!(clamp_limit(Some(-4), 3), 0);
        assert_eq!(clamp_limit(Some(10), 3), 10);
    }

    #[test]
    fn test_clamp_radius() {
        assert_eq!(clamp_radius(None, 3), 3);
        assert_eq!(clamp_radius(Some(-1), 3), 0);
        assert_eq!(clamp_radius(Some(i64::MAX), 3), u32::MAX);
    }
}
