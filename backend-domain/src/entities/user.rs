// User and session entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const UNKNOWN_IDENTIFIER: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub discord_id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub custom_nickname: Option<String>,
    pub discord_nickname: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl User {
    /// Identity written to history and leaderboard rows for this user's own actions.
    pub fn identifier(&self) -> String {
        [
            self.discord_nickname.as_deref(),
            Some(self.username.as_str()),
            Some(self.discord_id.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_IDENTIFIER)
        .to_string()
    }

    /// Name used when an admin records changes on this user's behalf.
    pub fn display_name(&self) -> String {
        self.custom_nickname
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.username.as_str())
            .to_string()
    }

    /// Every identity this user's history rows may have been written under,
    /// including identifiers from earlier naming schemes.
    pub fn activity_identifiers(&self) -> Vec<String> {
        let candidates = [
            Some(self.identifier()),
            Some(self.display_name()),
            Some(self.discord_id.clone()),
            Some(self.username.clone()),
            Some(self.id.clone()),
            Some(UNKNOWN_IDENTIFIER.to_string()),
        ];
        let mut out: Vec<String> = Vec::new();
        for candidate in candidates.into_iter().flatten() {
            let trimmed = candidate.trim();
            if !trimmed.is_empty() && !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        out
    }
}

/// Public projection used by the user management listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub custom_nickname: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            custom_nickname: user.custom_nickname.clone(),
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// Profile data gathered from Discord during login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginProfile {
    pub discord_id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub discord_nickname: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscordToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscordProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscordMember {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub nick: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscordGuildRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRole {
    pub id: String,
    pub name: String,
    pub color: u32,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub id: String,
    pub token_hash: String,
    pub user_id: String,
    pub roles: Vec<String>,
    pub is_in_guild: bool,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A live server-side session joined with its user.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub session_id: String,
    pub user: User,
    pub roles: Vec<String>,
    pub is_in_guild: bool,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn identifier(&self) -> String {
        self.user.identifier()
    }
}
