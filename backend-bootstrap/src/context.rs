use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::AppState;
use backend_domain::RoleHierarchy;
use backend_infrastructure::{build_app_state, connect, AppConfig, HttpDiscordService};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let pool = connect(&db_config).await?;
        let roles = RoleHierarchy::from_config(config.roles_config());
        info!("loaded {} configured discord roles", roles.roles().len());

        let discord = HttpDiscordService::new(
            config.to_discord_config(),
            runtime_config.request_timeout_seconds,
        )?;

        let state = build_app_state(pool, runtime_config, roles, Arc::new(discord));
        Ok(Self { state })
    }
}
