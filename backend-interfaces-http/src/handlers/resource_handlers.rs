use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use backend_application::commands::resource_commands::{self, ResourcesPutOutcome};
use backend_application::dtos::{
    CreateResourceRequest, MessageResponse, QuantityUpdateRequest, ResourceListQuery,
    ResourcesPutRequest, TargetUpdateRequest, TransferRequest,
};
use backend_application::queries::resource_queries;
use backend_application::AppState;
use backend_domain::services::QuantityChangeOutcome;
use backend_domain::{Resource, ResourceView};

use crate::error::HttpError;
use crate::middleware::require_session;

pub async fn list_resources(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ResourceListQuery>, QueryRejection>,
) -> Result<Json<Vec<ResourceView>>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Query(query) = query?;
    let resources = resource_queries::list_resources(&state, &ctx, query.into_filters()).await?;
    Ok(Json(resources))
}

pub async fn create_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<Json<Resource>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Json(payload) = payload?;
    Ok(Json(resource_commands::create_resource(&state, &ctx, payload).await?))
}

/// `PUT /resources` takes either `resourceMetadata` or `resourceUpdates`.
pub async fn update_resources(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ResourcesPutRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Json(payload) = payload?;
    let response = match resource_commands::update_resources(&state, &ctx, payload).await? {
        ResourcesPutOutcome::Metadata(resource) => Json(resource).into_response(),
        ResourcesPutOutcome::Batch(batch) => Json(batch).into_response(),
    };
    Ok(response)
}

pub async fn update_quantity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource_id): Path<String>,
    payload: Result<Json<QuantityUpdateRequest>, JsonRejection>,
) -> Result<Json<QuantityChangeOutcome>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Json(payload) = payload?;
    let outcome = resource_commands::update_quantity(&state, &ctx, &resource_id, payload).await?;
    Ok(Json(outcome))
}

pub async fn update_target(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource_id): Path<String>,
    payload: Result<Json<TargetUpdateRequest>, JsonRejection>,
) -> Result<Json<Resource>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Json(payload) = payload?;
    let resource = resource_commands::update_target(&state, &ctx, &resource_id, payload).await?;
    Ok(Json(resource))
}

pub async fn transfer_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource_id): Path<String>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<Resource>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Json(payload) = payload?;
    let resource = resource_commands::transfer(&state, &ctx, &resource_id, payload).await?;
    Ok(Json(resource))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource_id): Path<String>,
) -> Result<Json<MessageResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    Ok(Json(resource_commands::delete_resource(&state, &ctx, &resource_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::test_support::{login_as, test_state, ADMIN_ROLE, MEMBER_ROLE};

    fn spice_request() -> CreateResourceRequest {
        serde_json::from_value(json!({
            "name": "Spice Melange",
            "category": "Raw",
            "targetQuantity": 100000,
        }))
        .expect("request")
    }

    #[tokio::test]
    async fn members_update_quantities_but_cannot_create() {
        let state = test_state().await;
        let admin = login_as(&state, "stilgar", &[ADMIN_ROLE]).await;
        let member = login_as(&state, "chani", &[MEMBER_ROLE]).await;

        let err = create_resource(State(state.clone()), member.clone(), Ok(Json(spice_request())))
            .await
            .expect_err("members cannot create");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let Json(created) = create_resource(State(state.clone()), admin, Ok(Json(spice_request())))
            .await
            .expect("admin creates");
        assert_eq!(created.last_updated_by, "stilgar");

        let update: QuantityUpdateRequest = serde_json::from_value(json!({
            "updateType": "relative",
            "changeValue": 1000,
            "reason": "harvester run",
        }))
        .expect("request");
        let Json(outcome) = update_quantity(
            State(state.clone()),
            member.clone(),
            Path(created.id.clone()),
            Ok(Json(update)),
        )
        .await
        .expect("member updates");
        assert_eq!(outcome.resource.quantity_hagga, 1000);
        assert!(outcome.points_earned >= 100.0);

        let Json(listed) = list_resources(
            State(state.clone()),
            member,
            Ok(Query(ResourceListQuery::default())),
        )
        .await
        .expect("list");
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn requests_without_a_session_are_unauthorized() {
        let state = test_state().await;
        let err = list_resources(
            State(state),
            HeaderMap::new(),
            Ok(Query(ResourceListQuery::default())),
        )
        .await
        .expect_err("no session");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn on_behalf_of_is_ignored_for_members() {
        let state = test_state().await;
        let admin = login_as(&state, "stilgar", &[ADMIN_ROLE]).await;
        let member = login_as(&state, "chani", &[MEMBER_ROLE]).await;
        let Json(created) = create_resource(State(state.clone()), admin, Ok(Json(spice_request())))
            .await
            .expect("create");

        let update: QuantityUpdateRequest = serde_json::from_value(json!({
            "quantity": 5,
            "onBehalfOf": "someone-else",
        }))
        .expect("request");
        let Json(outcome) = update_quantity(
            State(state.clone()),
            member,
            Path(created.id.clone()),
            Ok(Json(update)),
        )
        .await
        .expect("member update");
        assert_eq!(outcome.resource.quantity_hagga, 5);
        assert_eq!(outcome.resource.last_updated_by, "chani");

        let history = state
            .history_repo
            .list_for_resource(&created.id, Utc::now() - Duration::days(1), 10)
            .await
            .expect("history");
        assert!(history
            .iter()
            .any(|entry| entry.updated_by == "chani" && entry.new_quantity_hagga == 5 && entry.reason.is_none()));
        assert!(history.iter().all(|entry| entry.updated_by != "someone-else"));
    }

    #[tokio::test]
    async fn admins_credit_changes_to_another_user() {
        let state = test_state().await;
        let admin = login_as(&state, "stilgar", &[ADMIN_ROLE]).await;
        let Json(created) =
            create_resource(State(state.clone()), admin.clone(), Ok(Json(spice_request())))
                .await
                .expect("create");

        let missing: QuantityUpdateRequest =
            serde_json::from_value(json!({"quantity": 5, "onBehalfOf": "nobody"}))
                .expect("request");
        let err = update_quantity(
            State(state.clone()),
            admin.clone(),
            Path(created.id.clone()),
            Ok(Json(missing)),
        )
        .await
        .expect_err("unknown user");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        login_as(&state, "chani", &[MEMBER_ROLE]).await;
        let chani = state
            .user_repo
            .list_users()
            .await
            .expect("users")
            .into_iter()
            .find(|user| user.username == "chani")
            .expect("chani");
        let update: QuantityUpdateRequest =
            serde_json::from_value(json!({"quantity": 7, "onBehalfOf": chani.id}))
                .expect("request");
        let Json(outcome) = update_quantity(
            State(state.clone()),
            admin,
            Path(created.id.clone()),
            Ok(Json(update)),
        )
        .await
        .expect("admin update");
        assert_eq!(outcome.resource.last_updated_by, "stilgar");

        let history = state
            .history_repo
            .list_for_resource(&created.id, Utc::now() - Duration::days(1), 10)
            .await
            .expect("history");
        assert!(history.iter().any(|entry| entry.updated_by == "chani"
            && entry.reason.as_deref() == Some("(entered by stilgar)")));
    }

    #[tokio::test]
    async fn deleting_a_missing_resource_is_not_found() {
        let state = test_state().await;
        let admin = login_as(&state, "stilgar", &[ADMIN_ROLE]).await;
        let err = delete_resource(State(state), admin, Path("missing".to_string()))
            .await
            .expect_err("missing");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
