use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info};

use backend_application::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub cache_entries: usize,
    pub sessions: u64,
}

/// Periodically drops expired cache entries and sessions.
pub async fn schedule_cache_cleanup(state: AppState) {
    let interval = Duration::from_secs(state.config.cache_cleanup_interval_seconds.max(1));
    info!("cache cleanup scheduled every {:?}", interval);
    loop {
        tokio::time::sleep(interval).await;
        match sweep_expired(&state).await {
            Ok(report) => debug!(
                "cache cleanup removed {} cache entries and {} sessions",
                report.cache_entries, report.sessions
            ),
            Err(err) => error!("cache cleanup failed: {}", err),
        }
    }
}

pub async fn sweep_expired(state: &AppState) -> Result<SweepReport> {
    let cache_entries =
        state.resource_cache.purge_expired().await + state.role_cache.purge_expired().await;
    let sessions = state.session_repo.purge_expired(Utc::now()).await?;
    Ok(SweepReport {
        cache_entries,
        sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use backend_application::ops::RESOURCE_LIST_KEY;
    use backend_domain::ports::DiscordService;
    use backend_domain::{
        DiscordGuildRole, DiscordMember, DiscordProfile, DiscordToken, LoginProfile, NewSession,
        RoleHierarchy, RuntimeConfig,
    };

    use crate::repositories::connect_in_memory;
    use crate::wiring::build_app_state;

    struct OfflineDiscord;

    #[async_trait]
    impl DiscordService for OfflineDiscord {
        fn authorize_url(&self, _state: &str) -> Result<String> {
            anyhow::bail!("offline")
        }
        async fn exchange_code(&self, _code: &str) -> Result<DiscordToken> {
            anyhow::bail!("offline")
        }
        async fn fetch_profile(&self, _access_token: &str) -> Result<DiscordProfile> {
            anyhow::bail!("offline")
        }
        async fn fetch_guild_member(&self, _access_token: &str) -> Result<Option<DiscordMember>> {
            Ok(None)
        }
        async fn fetch_guild_roles(&self) -> Result<Vec<DiscordGuildRole>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn sweep_drops_expired_cache_entries_and_sessions() {
        let pool = connect_in_memory().await.expect("pool");
        let config = RuntimeConfig {
            cache_ttl_seconds: 0,
            ..RuntimeConfig::default()
        };
        let state = build_app_state(pool, config, RoleHierarchy::new(Vec::new()), Arc::new(OfflineDiscord));

        state.resource_cache.insert(RESOURCE_LIST_KEY, Vec::new()).await;
        let user = state
            .user_repo
            .upsert_login(
                LoginProfile {
                    discord_id: "1".to_string(),
                    username: "paul".to_string(),
                    avatar: None,
                    discord_nickname: None,
                    roles: Vec::new(),
                },
                Utc::now(),
            )
            .await
            .expect("login");
        state
            .session_repo
            .create_session(NewSession {
                id: "s1".to_string(),
                token_hash: "h1".to_string(),
                user_id: user.id,
                roles: Vec::new(),
                is_in_guild: false,
                access_token: "t".to_string(),
                created_at: Utc::now() - ChronoDuration::hours(5),
                expires_at: Utc::now() - ChronoDuration::hours(1),
            })
            .await
            .expect("session");

        let report = sweep_expired(&state).await.expect("sweep");
        assert_eq!(
            report,
            SweepReport {
                cache_entries: 1,
                sessions: 1,
            }
        );
    }
}
