use std::sync::Arc;

use backend_domain::ports::{
    DiscordService, HealthCheckService, HistoryRepository, LeaderboardRepository,
    ResourceRepository, SessionRepository, UserRepository,
};
use backend_domain::{EnrichedRole, Resource, RoleHierarchy, RuntimeConfig};

use crate::ops::TtlCache;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub roles: Arc<RoleHierarchy>,
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub history_repo: Arc<dyn HistoryRepository>,
    pub leaderboard_repo: Arc<dyn LeaderboardRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub discord: Arc<dyn DiscordService>,
    pub health: Arc<dyn HealthCheckService>,
    pub resource_cache: Arc<TtlCache<Vec<Resource>>>,
    pub role_cache: Arc<TtlCache<Vec<EnrichedRole>>>,
    pub metrics: Arc<Metrics>,
}
