use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::error;

use crate::dtos::{SessionResponse, SessionUser};
use crate::{AppError, AppState};
use backend_domain::{AuthSession, UserPermissions};

/// An authenticated request: the stored session plus permissions derived
/// from the current role config.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: AuthSession,
    pub permissions: UserPermissions,
}

impl SessionContext {
    pub fn identifier(&self) -> String {
        self.session.identifier()
    }

    pub fn require_resource_access(&self) -> Result<(), AppError> {
        if self.permissions.has_resource_access {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    pub fn require_admin(&self, message: &str) -> Result<(), AppError> {
        if self.permissions.has_resource_admin_access {
            Ok(())
        } else {
            Err(AppError::forbidden(message))
        }
    }

    pub fn require_target_edit(&self, message: &str) -> Result<(), AppError> {
        if self.permissions.has_target_edit_access {
            Ok(())
        } else {
            Err(AppError::forbidden(message))
        }
    }
}

pub fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

pub async fn resolve_session(
    state: &AppState,
    token: Option<&str>,
) -> Result<SessionContext, AppError> {
    let token = token
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AppError::Unauthorized)?;
    let session = state
        .session_repo
        .find_session(&hash_session_token(token), Utc::now())
        .await
        .map_err(|err| {
            error!("failed to load session: {}", err);
            AppError::Internal(err)
        })?
        .ok_or(AppError::Unauthorized)?;
    let permissions = state.roles.permissions_for(&session.roles);
    Ok(SessionContext {
        session,
        permissions,
    })
}

pub fn session_info(state: &AppState, ctx: &SessionContext) -> SessionResponse {
    let session = &ctx.session;
    SessionResponse {
        user: SessionUser::new(&session.user, &session.roles, session.is_in_guild),
        expires_at: session.expires_at,
        highest_role: state.roles.highest_role(&session.roles).cloned(),
        hierarchy_roles: state
            .roles
            .hierarchy_roles(&session.roles)
            .into_iter()
            .cloned()
            .collect(),
        permissions: ctx.permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_sha256_hex() {
        assert_eq!(
            hash_session_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
