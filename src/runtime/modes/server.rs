//! Server mode
//!
//! Configures and starts the HTTP server with all ranking routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{AppStartTime, health_routes, json_config, query_config, ranking_routes};
use crate::config::{ServerConfig, get_config};
use crate::runtime::lifetime;

/// Build CORS middleware from configuration
///
/// An empty origin list keeps the browser's same-origin policy.
fn build_cors_middleware(config: &ServerConfig) -> Cors {
    let origins = &config.cors_allowed_origins;
    if origins.is_empty() {
        return Cors::default();
    }

    let mut cors = if origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors = cors
        .allowed_methods(vec!["GET", "POST", "HEAD", "OPTIONS"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .allowed_header(actix_web::http::header::ACCEPT)
        .expose_headers(vec![crate::api::middleware::REQUEST_ID_HEADER])
        .max_age(3600);
    cors
}

/// Run the HTTP server
///
/// **Note**: Logging and configuration must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let config = get_config();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            anyhow::anyhow!(e.format_simple())
        })?;
    let engine = startup.engine;

    let server_config = config.server.clone();
    let cpu_count = server_config.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let engine_for_shutdown = engine.clone();
    let cors_config = server_config.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(engine.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .service(health_routes())
            .configure(ranking_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", server_config.host, server_config.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(engine_for_shutdown) => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
