use anyhow::anyhow;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::dtos::{LoginResponse, OAuthCallbackQuery, SessionResponse, SessionUser};
use crate::queries::session_queries::{self, hash_session_token, SessionContext};
use crate::{AppError, AppState};
use backend_domain::utils::{current_millis, new_id};
use backend_domain::{DiscordMember, LoginProfile, NewSession};

pub const SESSION_COOKIE: &str = "tracker_session";

const OAUTH_STATE_MAX_AGE_MS: i64 = 10 * 60 * 1000;

type HmacSha256 = Hmac<Sha256>;

/// Outcome of a completed OAuth callback. The raw token is only ever
/// returned here; the store keeps its hash.
pub struct LoginResult {
    pub token: String,
    pub max_age_seconds: i64,
    pub response: LoginResponse,
}

pub fn begin_login(state: &AppState) -> Result<String, AppError> {
    let oauth_state = issue_oauth_state(&state.config.session_secret, current_millis())?;
    state.discord.authorize_url(&oauth_state).map_err(|err| {
        error!("failed to build discord authorize url: {}", err);
        AppError::Internal(err)
    })
}

pub async fn complete_login(
    state: &AppState,
    query: OAuthCallbackQuery,
) -> Result<LoginResult, AppError> {
    if let Some(reason) = query.error {
        warn!("discord oauth returned error: {}", reason);
        return Err(AppError::Unauthorized);
    }
    let oauth_state = query.state.ok_or(AppError::Unauthorized)?;
    verify_oauth_state(&state.config.session_secret, &oauth_state, current_millis())?;
    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let token = state.discord.exchange_code(&code).await.map_err(|err| {
        warn!("discord code exchange failed: {}", err);
        AppError::Unauthorized
    })?;
    let profile = state
        .discord
        .fetch_profile(&token.access_token)
        .await
        .map_err(|err| {
            warn!("discord profile lookup failed: {}", err);
            AppError::Unauthorized
        })?;
    let member = fetch_member_or_default(state, &token.access_token).await;
    let is_in_guild = member.is_some();
    let member = member.unwrap_or_default();

    let now = Utc::now();
    let user = state
        .user_repo
        .upsert_login(
            LoginProfile {
                discord_id: profile.id,
                username: profile.username,
                avatar: profile.avatar,
                discord_nickname: member.nick,
                roles: member.roles.clone(),
            },
            now,
        )
        .await
        .map_err(AppError::from_repo)?;

    let session_token = format!("{}{}", new_id(), new_id());
    let ttl_minutes = state.config.session_ttl_minutes.max(1) as i64;
    let expires_at = now + Duration::minutes(ttl_minutes);
    state
        .session_repo
        .create_session(NewSession {
            id: new_id(),
            token_hash: hash_session_token(&session_token),
            user_id: user.id.clone(),
            roles: member.roles.clone(),
            is_in_guild,
            access_token: token.access_token,
            created_at: now,
            expires_at,
        })
        .await
        .map_err(AppError::from_repo)?;

    info!(
        "user {} logged in (guild member: {}, roles: {})",
        user.identifier(),
        is_in_guild,
        member.roles.len()
    );
    let permissions = state.roles.permissions_for(&member.roles);
    Ok(LoginResult {
        token: session_token.clone(),
        max_age_seconds: ttl_minutes * 60,
        response: LoginResponse {
            token: session_token,
            expires_at,
            user: SessionUser::new(&user, &member.roles, is_in_guild),
            permissions,
        },
    })
}

/// Re-reads guild membership with the stored access token and updates both
/// the session and the user record.
pub async fn refresh_roles(
    state: &AppState,
    ctx: SessionContext,
) -> Result<SessionResponse, AppError> {
    let member = fetch_member_or_default(state, &ctx.session.access_token).await;
    let is_in_guild = member.is_some();
    let member = member.unwrap_or_default();

    state
        .session_repo
        .update_session_roles(&ctx.session.session_id, &member.roles, is_in_guild)
        .await
        .map_err(AppError::from_repo)?;
    state
        .user_repo
        .update_roles(&ctx.session.user.id, &member.roles, member.nick.as_deref())
        .await
        .map_err(AppError::from_repo)?;

    let mut session = ctx.session;
    session.roles = member.roles;
    session.is_in_guild = is_in_guild;
    session.user.roles = session.roles.clone();
    session.user.discord_nickname = member.nick;
    let refreshed = SessionContext {
        permissions: state.roles.permissions_for(&session.roles),
        session,
    };
    Ok(session_queries::session_info(state, &refreshed))
}

pub async fn logout(state: &AppState, ctx: &SessionContext) -> Result<(), AppError> {
    state
        .session_repo
        .delete_session(&ctx.session.session_id)
        .await
        .map_err(AppError::from_repo)
}

async fn fetch_member_or_default(state: &AppState, access_token: &str) -> Option<DiscordMember> {
    match state.discord.fetch_guild_member(access_token).await {
        Ok(member) => member,
        Err(err) => {
            warn!("guild member lookup failed, treating as non-member: {}", err);
            None
        }
    }
}

/// `state` parameter for the authorize redirect: `<millis>.<nonce>.<hmac>`.
pub fn issue_oauth_state(secret: &str, now_ms: i64) -> Result<String, AppError> {
    let payload = format!("{}.{}", now_ms, new_id());
    let signature = sign_hmac_sha256(secret, &payload)?;
    Ok(format!("{}.{}", payload, signature))
}

pub fn verify_oauth_state(secret: &str, value: &str, now_ms: i64) -> Result<(), AppError> {
    let (payload, signature) = value.rsplit_once('.').ok_or(AppError::Unauthorized)?;
    let expected = sign_hmac_sha256(secret, payload)?;
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        warn!("rejected oauth callback with a forged state");
        return Err(AppError::Unauthorized);
    }
    let issued_at = payload
        .split('.')
        .next()
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or(AppError::Unauthorized)?;
    let age = now_ms - issued_at;
    if !(0..=OAUTH_STATE_MAX_AGE_MS).contains(&age) {
        warn!("rejected oauth callback with an expired state");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn sign_hmac_sha256(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| AppError::Internal(anyhow!("hmac init failed: {err}")))?;
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}
