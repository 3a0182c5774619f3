use chrono::Utc;
use tracing::error;

use crate::ops::RESOURCE_LIST_KEY;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::services::render_csv;
use backend_domain::{Resource, ResourceFilters, ResourceView};

/// Lists resources; the unfiltered list is served from the TTL cache.
pub async fn list_resources(
    state: &AppState,
    ctx: &SessionContext,
    filters: ResourceFilters,
) -> Result<Vec<ResourceView>, AppError> {
    ctx.require_resource_access()?;
    let now = Utc::now();
    let resources = load_resources(state, &filters).await?;
    Ok(resources
        .into_iter()
        .map(|resource| ResourceView::new(resource, now))
        .collect())
}

pub async fn export_csv(
    state: &AppState,
    ctx: &SessionContext,
    filters: ResourceFilters,
) -> Result<String, AppError> {
    ctx.require_target_edit("Forbidden")?;
    let resources = load_resources(state, &filters).await?;
    render_csv(&resources).map_err(|err| {
        error!("failed to render resource csv: {}", err);
        AppError::Internal(err.into())
    })
}

pub(crate) async fn load_resources(
    state: &AppState,
    filters: &ResourceFilters,
) -> Result<Vec<Resource>, AppError> {
    let cacheable = filters.is_empty();
    if cacheable {
        if let Some(cached) = state.resource_cache.get(RESOURCE_LIST_KEY).await {
            return Ok(cached);
        }
    }
    let resources = state
        .resource_repo
        .list_resources(filters, Utc::now())
        .await
        .map_err(|err| {
            error!("failed to list resources: {}", err);
            AppError::Internal(err)
        })?;
    if cacheable {
        state
            .resource_cache
            .insert(RESOURCE_LIST_KEY, resources.clone())
            .await;
    }
    Ok(resources)
}
