use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePool;

use backend_application::ops::TtlCache;
use backend_application::{AppState, Metrics};
use backend_domain::ports::{DiscordService, ResourceRepository};
use backend_domain::{RoleHierarchy, RuntimeConfig};

use crate::repositories::{
    SqliteHistoryRepository, SqliteLeaderboardRepository, SqliteResourceRepository,
    SqliteSessionRepository, SqliteUserRepository,
};
use crate::services::DefaultHealthService;

/// Assembles the application state on top of one SQLite pool.
pub fn build_app_state(
    pool: SqlitePool,
    config: RuntimeConfig,
    roles: RoleHierarchy,
    discord: Arc<dyn DiscordService>,
) -> AppState {
    let resource_repo: Arc<dyn ResourceRepository> =
        Arc::new(SqliteResourceRepository::new(pool.clone()));
    let cache_ttl = Duration::from_secs(config.cache_ttl_seconds);
    AppState {
        health: Arc::new(DefaultHealthService::new(resource_repo.clone())),
        resource_repo,
        history_repo: Arc::new(SqliteHistoryRepository::new(pool.clone())),
        leaderboard_repo: Arc::new(SqliteLeaderboardRepository::new(pool.clone())),
        user_repo: Arc::new(SqliteUserRepository::new(pool.clone())),
        session_repo: Arc::new(SqliteSessionRepository::new(pool)),
        discord,
        roles: Arc::new(roles),
        resource_cache: Arc::new(TtlCache::new(cache_ttl)),
        role_cache: Arc::new(TtlCache::new(cache_ttl)),
        metrics: Arc::new(Metrics::default()),
        config,
    }
}
