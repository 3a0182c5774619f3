use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, DiscordConfig, RuntimeConfig};

use crate::config::validation::{validate_database_url, validate_snowflake};

const DEFAULT_SESSION_SECRET: &str = "change-me";
const DEFAULT_DISCORD_API: &str = "https://discord.com/api/v10";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub public_base_url: String,
    pub metrics_token: Option<String>,
    pub session_secret: String,
    pub session_ttl_minutes: u64,
    pub cookie_secure: bool,
    pub cache_ttl_seconds: u64,
    pub cache_cleanup_interval_seconds: u64,
    pub gdpr_hard_delete: bool,
    pub bulk_import_max_bytes: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub database: DatabaseSection,
    pub discord: DiscordSection,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DiscordSection {
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub guild_id: Option<String>,
    pub bot_token: Option<String>,
    /// Inline JSON array of role configs.
    pub roles_config: Option<String>,
    /// Path to a JSON file holding the role configs, used when
    /// `roles_config` is empty.
    pub roles_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            public_base_url: runtime.public_base_url,
            metrics_token: None,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl_minutes: runtime.session_ttl_minutes,
            cookie_secure: runtime.cookie_secure,
            cache_ttl_seconds: runtime.cache_ttl_seconds,
            cache_cleanup_interval_seconds: runtime.cache_cleanup_interval_seconds,
            gdpr_hard_delete: runtime.gdpr_hard_delete,
            bulk_import_max_bytes: runtime.bulk_import_max_bytes,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            database: DatabaseSection::default(),
            discord: DiscordSection {
                api_base_url: DEFAULT_DISCORD_API.to_string(),
                ..DiscordSection::default()
            },
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./resource-tracker.db".to_string(),
            max_connections: 5,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("TRACKER_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::parse(&content)?
        } else {
            warn!("config.toml not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.normalize();
        config.resolve_paths(base_dir);
        config.load_roles_file().await?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        self.metrics_token = non_blank(self.metrics_token.take());
        let discord = &mut self.discord;
        discord.client_secret = non_blank(discord.client_secret.take());
        discord.redirect_uri = non_blank(discord.redirect_uri.take());
        discord.guild_id = non_blank(discord.guild_id.take());
        discord.bot_token = non_blank(discord.bot_token.take());
        discord.roles_config = non_blank(discord.roles_config.take());
        discord.roles_file = non_blank(discord.roles_file.take());
        discord.client_id = discord.client_id.trim().to_string();
        if discord.api_base_url.trim().is_empty() {
            discord.api_base_url = DEFAULT_DISCORD_API.to_string();
        }
        discord.api_base_url = discord.api_base_url.trim_end_matches('/').to_string();
        self.public_base_url = self.public_base_url.trim_end_matches('/').to_string();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(roles_file) = &self.discord.roles_file {
            self.discord.roles_file = Some(resolve_path(base, roles_file));
        }
    }

    async fn load_roles_file(&mut self) -> Result<()> {
        if self.discord.roles_config.is_some() {
            return Ok(());
        }
        if let Some(path) = &self.discord.roles_file {
            let content = fs::read_to_string(path)
                .await
                .map_err(|err| anyhow!("failed to read roles file {}: {}", path, err))?;
            self.discord.roles_config = non_blank(Some(content));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.public_base_url.trim().is_empty() {
            return Err(anyhow!("public_base_url must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.bulk_import_max_bytes == 0 || self.bulk_import_max_bytes as u64 >= self.max_body_bytes {
            return Err(anyhow!(
                "bulk_import_max_bytes must be between 1 and max_body_bytes"
            ));
        }
        if self.session_ttl_minutes == 0 {
            return Err(anyhow!("session_ttl_minutes must be greater than 0"));
        }
        if self.session_secret.trim().is_empty() {
            return Err(anyhow!("session_secret must not be empty"));
        }
        if self.session_secret == DEFAULT_SESSION_SECRET {
            warn!("session_secret is the default value; set TRACKER_SESSION_SECRET");
        }
        if self.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be greater than 0"));
        }
        validate_database_url(&self.database.url)?;
        if let Some(guild_id) = &self.discord.guild_id {
            validate_snowflake(guild_id, "discord.guild_id")?;
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            public_base_url: self.public_base_url.clone(),
            metrics_token: self.metrics_token.clone(),
            session_secret: self.session_secret.clone(),
            session_ttl_minutes: self.session_ttl_minutes,
            cookie_secure: self.cookie_secure,
            cache_ttl_seconds: self.cache_ttl_seconds,
            cache_cleanup_interval_seconds: self.cache_cleanup_interval_seconds,
            gdpr_hard_delete: self.gdpr_hard_delete,
            bulk_import_max_bytes: self.bulk_import_max_bytes,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn to_discord_config(&self) -> DiscordConfig {
        DiscordConfig {
            api_base_url: self.discord.api_base_url.clone(),
            client_id: self.discord.client_id.clone(),
            client_secret: self.discord.client_secret.clone(),
            redirect_uri: self
                .discord
                .redirect_uri
                .clone()
                .unwrap_or_else(|| format!("{}/api/auth/callback", self.public_base_url)),
            guild_id: self.discord.guild_id.clone(),
            bot_token: self.discord.bot_token.clone(),
        }
    }

    pub fn roles_config(&self) -> Option<&str> {
        self.discord.roles_config.as_deref()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("TRACKER_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("TRACKER_PUBLIC_BASE_URL") {
            self.public_base_url = value;
        }
        if let Ok(value) = env::var("TRACKER_METRICS_TOKEN") {
            self.metrics_token = Some(value);
        }
        if let Ok(value) = env::var("TRACKER_SESSION_SECRET") {
            self.session_secret = value;
        }
        if let Ok(value) = env::var("TRACKER_SESSION_TTL_MINUTES") {
            self.session_ttl_minutes = value.parse().unwrap_or(self.session_ttl_minutes);
        }
        if let Ok(value) = env::var("TRACKER_COOKIE_SECURE") {
            self.cookie_secure = value.parse().unwrap_or(self.cookie_secure);
        }
        if let Ok(value) = env::var("DATABASE_URL") {
            self.database.url = value;
        }
        if let Ok(value) = env::var("TRACKER_DATABASE_URL") {
            self.database.url = value;
        }
        if let Ok(value) = env::var("TRACKER_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = value.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(value) = env::var("TRACKER_CACHE_TTL_SECONDS") {
            self.cache_ttl_seconds = value.parse().unwrap_or(self.cache_ttl_seconds);
        }
        if let Ok(value) = env::var("TRACKER_CACHE_CLEANUP_INTERVAL_SECONDS") {
            self.cache_cleanup_interval_seconds =
                value.parse().unwrap_or(self.cache_cleanup_interval_seconds);
        }
        if let Ok(value) = env::var("TRACKER_GDPR_HARD_DELETE") {
            self.gdpr_hard_delete = value.parse().unwrap_or(self.gdpr_hard_delete);
        }
        if let Ok(value) = env::var("TRACKER_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("TRACKER_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("DISCORD_CLIENT_ID") {
            self.discord.client_id = value;
        }
        if let Ok(value) = env::var("DISCORD_CLIENT_SECRET") {
            self.discord.client_secret = Some(value);
        }
        if let Ok(value) = env::var("DISCORD_REDIRECT_URI") {
            self.discord.redirect_uri = Some(value);
        }
        if let Ok(value) = env::var("DISCORD_GUILD_ID") {
            self.discord.guild_id = Some(value);
        }
        if let Ok(value) = env::var("DISCORD_BOT_TOKEN") {
            self.discord.bot_token = Some(value);
        }
        if let Ok(value) = env::var("DISCORD_ROLES_CONFIG") {
            self.discord.roles_config = Some(value);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
