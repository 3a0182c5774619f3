use axum::routing::{delete, get, post, put};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    auth_handlers, bulk_handlers, history_handlers, leaderboard_handlers, ops_handlers,
    resource_handlers, role_handlers, user_handlers,
};
use crate::middleware::track_request_errors;

/// The API is served under `/api/v1` and, for older clients, `/api`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .nest("/api", api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_request_errors,
        ))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth_handlers::login))
        .route("/auth/callback", get(auth_handlers::oauth_callback))
        .route("/auth/session", get(auth_handlers::current_session))
        .route("/auth/refresh-roles", post(auth_handlers::refresh_roles))
        .route("/auth/logout", post(auth_handlers::logout))
        .route(
            "/resources",
            get(resource_handlers::list_resources)
                .post(resource_handlers::create_resource)
                .put(resource_handlers::update_resources),
        )
        .route(
            "/resources/bulk",
            get(bulk_handlers::export_resources_csv).post(bulk_handlers::preview_bulk_import),
        )
        .route(
            "/resources/bulk/confirm",
            post(bulk_handlers::confirm_bulk_import),
        )
        .route(
            "/resources/:id",
            put(resource_handlers::update_quantity).delete(resource_handlers::delete_resource),
        )
        .route("/resources/:id/target", put(resource_handlers::update_target))
        .route(
            "/resources/:id/transfer",
            put(resource_handlers::transfer_resource),
        )
        .route(
            "/resources/:id/history",
            get(history_handlers::resource_history),
        )
        .route(
            "/resources/:id/history/:entry_id",
            delete(history_handlers::delete_history_entry),
        )
        .route("/leaderboard", get(leaderboard_handlers::leaderboard))
        .route(
            "/leaderboard/:user_id",
            get(leaderboard_handlers::user_contributions),
        )
        .route("/user/activity", get(user_handlers::user_activity))
        .route("/user/data-export", get(user_handlers::export_own_data))
        .route(
            "/user/data-deletion",
            post(user_handlers::request_data_deletion),
        )
        .route("/users", get(user_handlers::list_users))
        .route(
            "/users/:user_id/data-export",
            get(user_handlers::export_user_data),
        )
        .route("/discord-roles", get(role_handlers::discord_roles))
        .route("/ops/health/live", get(ops_handlers::health_live))
        .route("/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
}
