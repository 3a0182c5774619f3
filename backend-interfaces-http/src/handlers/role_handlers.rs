use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::role_queries;
use backend_application::AppState;
use backend_domain::EnrichedRole;

use crate::error::HttpError;
use crate::middleware::require_session;

pub async fn discord_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<EnrichedRole>>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    Ok(Json(role_queries::discord_roles(&state, &ctx).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::test_support::{login_as, test_state, MEMBER_ROLE};

    #[tokio::test]
    async fn roles_are_enriched_and_need_a_session() {
        let state = test_state().await;
        let err = discord_roles(State(state.clone()), HeaderMap::new())
            .await
            .expect_err("anonymous");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let member = login_as(&state, "chani", &[MEMBER_ROLE]).await;
        let Json(roles) = discord_roles(State(state), member).await.expect("roles");
        assert_eq!(roles.len(), 1);
        assert!(roles[0].permissions.contains(&"Administrator".to_string()));
    }
}
