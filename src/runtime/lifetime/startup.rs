//! Startup wiring shared by every execution mode

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::ranking::RankingEngine;
use crate::storage::StorageFactory;

/// Components prepared before the server starts
pub struct StartupContext {
    pub engine: Arc<RankingEngine>,
}

/// Build storage and the engine, then re-rank once
///
/// The re-rank repairs ranks left stale by a crash between an aggregate
/// increment and its recompute.
pub async fn prepare_engine(config: &AppConfig) -> Result<Arc<RankingEngine>> {
    let storage = StorageFactory::create(&config.database).await?;
    info!(
        "Using storage backend: {}",
        storage.aggregates.backend_name()
    );

    let engine = Arc::new(RankingEngine::new(storage, config.ranking.clone()));

    if config.ranking.distinct_global_donors {
        info!("Global donor count: distinct donors across cities");
    } else {
        info!("Global donor count: sum of per-city donor counts");
    }

    Ok(engine)
}

/// 服务启动准备：构建引擎并执行一次排名重建
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let engine = prepare_engine(config).await?;

    match engine.rebuild_ranking().await {
        Ok(0) => info!("No cities recorded yet"),
        Ok(count) => info!("Startup ranking rebuilt for {} cities", count),
        Err(e) => {
            // 重建失败不阻止启动，下一次捐赠会重新排名
            warn!("Startup ranking rebuild failed: {}", e);
        }
    }

    Ok(StartupContext { engine })
}
