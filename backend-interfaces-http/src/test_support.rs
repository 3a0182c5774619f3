use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{Duration, Utc};

use backend_application::queries::session_queries::hash_session_token;
use backend_application::AppState;
use backend_domain::ports::DiscordService;
use backend_domain::utils::new_id;
use backend_domain::{
    DiscordGuildRole, DiscordMember, DiscordProfile, DiscordToken, LoginProfile, NewSession,
    RoleConfig, RoleHierarchy, RuntimeConfig,
};
use backend_infrastructure::{build_app_state, connect_in_memory};

pub const ADMIN_ROLE: &str = "100";
pub const MEMBER_ROLE: &str = "200";

/// Discord stand-in that logs everyone in as an admin guild member.
pub struct StubDiscord;

#[async_trait]
impl DiscordService for StubDiscord {
    fn authorize_url(&self, state: &str) -> Result<String> {
        Ok(format!("https://discord.test/oauth2/authorize?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<DiscordToken> {
        if code == "bad" {
            anyhow::bail!("invalid_grant");
        }
        Ok(DiscordToken {
            access_token: "discord-access".to_string(),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(604800),
            scope: None,
        })
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<DiscordProfile> {
        Ok(DiscordProfile {
            id: "9001".to_string(),
            username: "stilgar".to_string(),
            global_name: None,
            avatar: None,
        })
    }

    async fn fetch_guild_member(&self, _access_token: &str) -> Result<Option<DiscordMember>> {
        Ok(Some(DiscordMember {
            roles: vec![ADMIN_ROLE.to_string()],
            nick: Some("Naib".to_string()),
        }))
    }

    async fn fetch_guild_roles(&self) -> Result<Vec<DiscordGuildRole>> {
        Ok(vec![DiscordGuildRole {
            id: ADMIN_ROLE.to_string(),
            name: "Officer".to_string(),
            color: 0,
            position: 5,
        }])
    }
}

fn hierarchy() -> RoleHierarchy {
    RoleHierarchy::new(vec![
        RoleConfig {
            id: ADMIN_ROLE.to_string(),
            name: "Officer".to_string(),
            level: 100,
            is_admin: true,
            can_edit_targets: true,
            can_access_resources: true,
            can_view_reports: true,
            can_manage_users: true,
            can_export_data: true,
        },
        RoleConfig {
            id: MEMBER_ROLE.to_string(),
            name: "Member".to_string(),
            level: 10,
            is_admin: false,
            can_edit_targets: false,
            can_access_resources: true,
            can_view_reports: false,
            can_manage_users: false,
            can_export_data: false,
        },
    ])
}

pub async fn test_state() -> AppState {
    let pool = connect_in_memory().await.expect("pool");
    build_app_state(pool, RuntimeConfig::default(), hierarchy(), Arc::new(StubDiscord))
}

/// Creates a user with a live session and returns bearer headers for it.
pub async fn login_as(state: &AppState, username: &str, roles: &[&str]) -> HeaderMap {
    let roles: Vec<String> = roles.iter().map(|role| role.to_string()).collect();
    let now = Utc::now();
    let user = state
        .user_repo
        .upsert_login(
            LoginProfile {
                discord_id: format!("discord-{}", username),
                username: username.to_string(),
                avatar: None,
                discord_nickname: None,
                roles: roles.clone(),
            },
            now,
        )
        .await
        .expect("user");
    let token = new_id();
    state
        .session_repo
        .create_session(NewSession {
            id: new_id(),
            token_hash: hash_session_token(&token),
            user_id: user.id,
            roles,
            is_in_guild: true,
            access_token: "discord-access".to_string(),
            created_at: now,
            expires_at: now + Duration::hours(1),
        })
        .await
        .expect("session");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("header"),
    );
    headers
}
