use async_trait::async_trait;

use crate::entities::{DiscordGuildRole, DiscordMember, DiscordProfile, DiscordToken};

/// Discord REST API access used by login and role listing.
#[async_trait]
pub trait DiscordService: Send + Sync {
    fn authorize_url(&self, state: &str) -> anyhow::Result<String>;
    async fn exchange_code(&self, code: &str) -> anyhow::Result<DiscordToken>;
    async fn fetch_profile(&self, access_token: &str) -> anyhow::Result<DiscordProfile>;
    /// Guild membership of the token owner; `None` when they are not a member
    /// or Discord refused the lookup.
    async fn fetch_guild_member(&self, access_token: &str) -> anyhow::Result<Option<DiscordMember>>;
    async fn fetch_guild_roles(&self) -> anyhow::Result<Vec<DiscordGuildRole>>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
}
