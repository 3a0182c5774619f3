use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::dtos::{
    BatchQuantityUpdate, BatchUpdateResponse, CreateResourceRequest, MessageResponse,
    QuantityUpdateRequest, ResourceMetadataRequest, ResourcesPutRequest, TargetUpdateRequest,
    TransferRequest,
};
use crate::ops::RESOURCE_LIST_KEY;
use crate::queries::resource_queries::load_resources;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::services::{QuantityChange, QuantityChangeOutcome};
use backend_domain::utils::normalize_optional_text;
use backend_domain::{
    quantity_in_range, DomainError, NewResource, Resource, ResourceFilters,
    ResourceMetadataUpdate, ResourceView, TransferDirection, MAX_QUANTITY,
};

const ADMIN_REQUIRED: &str = "Admin access required";

/// Result of `PUT /resources`, which multiplexes two request kinds.
pub enum ResourcesPutOutcome {
    Metadata(Resource),
    Batch(BatchUpdateResponse),
}

pub async fn create_resource(
    state: &AppState,
    ctx: &SessionContext,
    payload: CreateResourceRequest,
) -> Result<Resource, AppError> {
    ctx.require_admin(ADMIN_REQUIRED)?;
    let (Some(name), Some(category)) = (
        normalize_optional_text(payload.name),
        normalize_optional_text(payload.category),
    ) else {
        return Err(AppError::BadRequest(
            "Name and category are required".to_string(),
        ));
    };

    let quantity_hagga = payload.quantity_hagga.or(payload.quantity).unwrap_or(0);
    let quantity_deep_desert = payload.quantity_deep_desert.unwrap_or(0);
    if quantity_hagga < 0 || quantity_deep_desert < 0 {
        return Err(AppError::BadRequest(
            "Quantity cannot be negative".to_string(),
        ));
    }
    if !quantity_in_range(quantity_hagga) || !quantity_in_range(quantity_deep_desert) {
        return Err(quantity_too_large());
    }
    validate_target(payload.target_quantity)?;

    let resource = NewResource {
        name,
        category,
        subcategory: normalize_optional_text(payload.subcategory),
        tier: payload.tier,
        description: normalize_optional_text(payload.description),
        icon: normalize_optional_text(payload.icon),
        image_url: normalize_optional_text(payload.image_url),
        quantity_hagga,
        quantity_deep_desert,
        target_quantity: payload.target_quantity.filter(|target| *target > 0),
        multiplier: effective_multiplier(payload.multiplier),
        is_priority: payload.is_priority.unwrap_or(false),
    };
    let actor = ctx.identifier();
    let created = state
        .resource_repo
        .create_resource(resource, &actor)
        .await
        .map_err(AppError::from_repo)?;
    invalidate_resource_cache(state).await;
    info!("resource {} ({}) created by {}", created.name, created.id, actor);
    Ok(created)
}

pub async fn update_resources(
    state: &AppState,
    ctx: &SessionContext,
    payload: ResourcesPutRequest,
) -> Result<ResourcesPutOutcome, AppError> {
    if let Some(metadata) = payload.resource_metadata {
        ctx.require_admin(ADMIN_REQUIRED)?;
        let updated = update_metadata(state, ctx, metadata).await?;
        return Ok(ResourcesPutOutcome::Metadata(updated));
    }
    if let Some(raw_updates) = payload.resource_updates {
        if !ctx.permissions.has_resource_access {
            return Err(AppError::forbidden("Resource access required"));
        }
        let updates = parse_batch_updates(raw_updates)?;
        let response = apply_batch_updates(state, ctx, updates).await?;
        return Ok(ResourcesPutOutcome::Batch(response));
    }
    Err(AppError::BadRequest("Invalid request body".to_string()))
}

async fn update_metadata(
    state: &AppState,
    ctx: &SessionContext,
    payload: ResourceMetadataRequest,
) -> Result<Resource, AppError> {
    let (Some(id), Some(name), Some(category)) = (
        normalize_optional_text(payload.id),
        normalize_optional_text(payload.name),
        normalize_optional_text(payload.category),
    ) else {
        return Err(AppError::BadRequest(
            "ID, name, and category are required".to_string(),
        ));
    };
    let update = ResourceMetadataUpdate {
        id,
        name,
        category,
        subcategory: normalize_optional_text(payload.subcategory),
        tier: payload.tier,
        description: normalize_optional_text(payload.description),
        icon: normalize_optional_text(payload.icon),
        image_url: normalize_optional_text(payload.image_url),
        multiplier: effective_multiplier(payload.multiplier),
        is_priority: payload.is_priority.unwrap_or(false),
    };
    let updated = state
        .resource_repo
        .update_metadata(update, &ctx.identifier())
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(DomainError::resource_not_found)?;
    invalidate_resource_cache(state).await;
    Ok(updated)
}

fn parse_batch_updates(raw: Value) -> Result<Vec<BatchQuantityUpdate>, AppError> {
    let invalid = || AppError::BadRequest("Invalid resourceUpdates format".to_string());
    match &raw {
        Value::Array(items) if !items.is_empty() => {}
        _ => return Err(invalid()),
    }
    serde_json::from_value(raw).map_err(|_| invalid())
}

/// Applies each update in its own transaction. Updates naming unknown
/// resources are skipped.
async fn apply_batch_updates(
    state: &AppState,
    ctx: &SessionContext,
    updates: Vec<BatchQuantityUpdate>,
) -> Result<BatchUpdateResponse, AppError> {
    let actor = ctx.identifier();
    let mut points_breakdown = Vec::new();
    for BatchQuantityUpdate { id, update } in updates {
        let change = QuantityChange {
            resource_id: id.clone(),
            update_type: update.update_type(),
            field: update.quantity_field(),
            quantity: update.quantity,
            change_value: update.change_value,
            reason: normalize_optional_text(update.reason),
            acting_user: actor.clone(),
            effective_user: actor.clone(),
        };
        match state.resource_repo.apply_quantity_change(change).await {
            Ok(outcome) => {
                state.metrics.record_quantity_update(outcome.points_earned);
                if let Some(calculation) = outcome.points_calculation {
                    points_breakdown.push(calculation);
                }
            }
            Err(err) => match AppError::from_repo(err) {
                AppError::NotFound(_) => warn!("batch update skipped unknown resource {}", id),
                other => {
                    invalidate_resource_cache(state).await;
                    return Err(other);
                }
            },
        }
    }
    invalidate_resource_cache(state).await;

    let now = Utc::now();
    let resources = load_resources(state, &ResourceFilters::default())
        .await?
        .into_iter()
        .map(|resource| ResourceView::new(resource, now))
        .collect();
    let total_points_earned = points_breakdown
        .iter()
        .map(|calculation| calculation.final_points)
        .sum();
    Ok(BatchUpdateResponse {
        resources,
        total_points_earned,
        points_breakdown,
    })
}

/// Records a quantity change on one resource. Admins may credit the change
/// to another user through `onBehalfOf`; for anyone else the field is
/// ignored and the change is credited to the caller.
pub async fn update_quantity(
    state: &AppState,
    ctx: &SessionContext,
    resource_id: &str,
    payload: QuantityUpdateRequest,
) -> Result<QuantityChangeOutcome, AppError> {
    ctx.require_resource_access()?;
    let acting_user = ctx.identifier();
    let mut effective_user = acting_user.clone();
    let mut reason = normalize_optional_text(payload.reason.clone());

    let on_behalf_of = normalize_optional_text(payload.on_behalf_of.clone());
    if on_behalf_of.is_some() && !ctx.permissions.has_resource_admin_access {
        warn!("ignoring onBehalfOf from non-admin {}", acting_user);
    }
    if let Some(target_user_id) =
        on_behalf_of.filter(|_| ctx.permissions.has_resource_admin_access)
    {
        let target = state
            .user_repo
            .find_user(&target_user_id)
            .await
            .map_err(AppError::from_repo)?
            .ok_or_else(|| AppError::NotFound("User to act on behalf of not found".to_string()))?;
        effective_user = target.display_name();
        let audit_note = format!("(entered by {})", acting_user);
        reason = Some(match reason {
            Some(text) => format!("{} {}", text, audit_note),
            None => audit_note,
        });
    }

    let change = QuantityChange {
        resource_id: resource_id.to_string(),
        update_type: payload.update_type(),
        field: payload.quantity_field(),
        quantity: payload.quantity,
        change_value: payload.change_value,
        reason,
        acting_user,
        effective_user,
    };
    let outcome = state
        .resource_repo
        .apply_quantity_change(change)
        .await
        .map_err(AppError::from_repo)?;
    invalidate_resource_cache(state).await;
    state.metrics.record_quantity_update(outcome.points_earned);
    Ok(outcome)
}

pub async fn update_target(
    state: &AppState,
    ctx: &SessionContext,
    resource_id: &str,
    payload: TargetUpdateRequest,
) -> Result<Resource, AppError> {
    ctx.require_resource_access()?;
    ctx.require_target_edit("Insufficient permissions - admin access required")?;
    validate_target(payload.target_quantity)?;
    let updated = state
        .resource_repo
        .update_target(resource_id, payload.target_quantity, &ctx.identifier())
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(DomainError::resource_not_found)?;
    invalidate_resource_cache(state).await;
    Ok(updated)
}

pub async fn transfer(
    state: &AppState,
    ctx: &SessionContext,
    resource_id: &str,
    payload: TransferRequest,
) -> Result<Resource, AppError> {
    ctx.require_resource_access()?;
    let (Some(amount), Some(direction)) = (payload.transfer_amount, payload.transfer_direction)
    else {
        return Err(AppError::BadRequest(
            "transferAmount and transferDirection are required".to_string(),
        ));
    };
    let direction = TransferDirection::parse(&direction)
        .ok_or_else(|| AppError::BadRequest("Invalid transferDirection".to_string()))?;
    if amount > MAX_QUANTITY {
        return Err(quantity_too_large());
    }

    let updated = state
        .resource_repo
        .transfer(resource_id, amount, direction, &ctx.identifier())
        .await
        .map_err(AppError::from_repo)?;
    invalidate_resource_cache(state).await;
    state.metrics.record_transfer();
    Ok(updated)
}

pub async fn delete_resource(
    state: &AppState,
    ctx: &SessionContext,
    resource_id: &str,
) -> Result<MessageResponse, AppError> {
    ctx.require_admin(ADMIN_REQUIRED)?;
    let deleted = state
        .resource_repo
        .delete_resource(resource_id)
        .await
        .map_err(|err| {
            error!("failed to delete resource {}: {}", resource_id, err);
            AppError::from_repo(err)
        })?;
    if !deleted {
        return Err(DomainError::resource_not_found().into());
    }
    invalidate_resource_cache(state).await;
    info!("resource {} deleted by {}", resource_id, ctx.identifier());
    Ok(MessageResponse::new(
        "Resource and its history deleted successfully",
    ))
}

pub(crate) async fn invalidate_resource_cache(state: &AppState) {
    state.resource_cache.invalidate(RESOURCE_LIST_KEY).await;
}

fn quantity_too_large() -> AppError {
    AppError::BadRequest(format!("Quantity cannot exceed {}", MAX_QUANTITY))
}

fn validate_target(target: Option<i64>) -> Result<(), AppError> {
    match target {
        Some(value) if value < 0 => Err(AppError::BadRequest(
            "Target quantity cannot be negative".to_string(),
        )),
        Some(value) if value > MAX_QUANTITY => Err(quantity_too_large()),
        _ => Ok(()),
    }
}

/// Missing or zero multipliers fall back to 1.0.
fn effective_multiplier(value: Option<f64>) -> f64 {
    value
        .filter(|multiplier| multiplier.is_finite() && *multiplier > 0.0)
        .unwrap_or(1.0)
}
