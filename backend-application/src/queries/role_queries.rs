use tracing::{error, info};

use crate::ops::DISCORD_ROLES_KEY;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::EnrichedRole;

/// Guild roles that appear in the role config, labelled with what they grant.
pub async fn discord_roles(
    state: &AppState,
    _ctx: &SessionContext,
) -> Result<Vec<EnrichedRole>, AppError> {
    if let Some(cached) = state.role_cache.get(DISCORD_ROLES_KEY).await {
        return Ok(cached);
    }
    let guild_roles = state.discord.fetch_guild_roles().await.map_err(|err| {
        error!("failed to fetch guild roles from discord: {}", err);
        AppError::BadGateway("Failed to fetch roles from Discord".to_string())
    })?;
    let enriched = state.roles.enrich(guild_roles);
    info!("cached {} configured guild roles", enriched.len());
    state
        .role_cache
        .insert(DISCORD_ROLES_KEY, enriched.clone())
        .await;
    Ok(enriched)
}
