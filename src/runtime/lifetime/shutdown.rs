use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::ranking::RankingEngine;

/// 关闭任务超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Wait for Ctrl+C, then log the final state
pub async fn listen_for_shutdown(engine: Arc<RankingEngine>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), engine.city_count()).await {
        Ok(Ok(count)) => info!("Shutting down with {} ranked cities", count),
        Ok(Err(e)) => warn!("Could not read final city count: {}", e),
        Err(_) => warn!(
            "Final city count timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
