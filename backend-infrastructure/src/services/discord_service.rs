use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use backend_domain::ports::DiscordService;
use backend_domain::{DiscordConfig, DiscordGuildRole, DiscordMember, DiscordProfile, DiscordToken};

const OAUTH_SCOPES: &str = "identify guilds.members.read";
const USER_AGENT: &str = concat!("resource-tracker/", env!("CARGO_PKG_VERSION"));

/// Discord REST client for the OAuth login flow and guild lookups.
pub struct HttpDiscordService {
    client: Client,
    config: DiscordConfig,
}

impl HttpDiscordService {
    pub fn new(config: DiscordConfig, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(3)))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn guild_id(&self) -> Result<&str> {
        self.config
            .guild_id
            .as_deref()
            .ok_or_else(|| anyhow!("discord guild_id not configured"))
    }
}

#[async_trait]
impl DiscordService for HttpDiscordService {
    fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.endpoint("/oauth2/authorize"),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", OAUTH_SCOPES),
                ("state", state),
                ("prompt", "none"),
            ],
        )?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<DiscordToken> {
        let secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or_else(|| anyhow!("discord client_secret not configured"))?;
        let response = self
            .client
            .post(self.endpoint("/oauth2/token"))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", secret),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("discord token exchange responded {}: {}", status, body);
        }
        Ok(response.json::<DiscordToken>().await?)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<DiscordProfile> {
        let profile = self
            .client
            .get(self.endpoint("/users/@me"))
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?
            .error_for_status()?
            .json::<DiscordProfile>()
            .await?;
        Ok(profile)
    }

    async fn fetch_guild_member(&self, access_token: &str) -> Result<Option<DiscordMember>> {
        let Some(guild_id) = self.config.guild_id.as_deref() else {
            debug!("no guild configured, skipping membership lookup");
            return Ok(None);
        };
        let response = self
            .client
            .get(self.endpoint(&format!("/users/@me/guilds/{}/member", guild_id)))
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.json::<DiscordMember>().await?)),
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(None),
            status => {
                warn!("discord member lookup responded {}", status);
                bail!("discord member lookup responded {}", status)
            }
        }
    }

    async fn fetch_guild_roles(&self) -> Result<Vec<DiscordGuildRole>> {
        let guild_id = self.guild_id()?;
        let token = self
            .config
            .bot_token
            .as_deref()
            .ok_or_else(|| anyhow!("discord bot_token not configured"))?;
        let roles = self
            .client
            .get(self.endpoint(&format!("/guilds/{}/roles", guild_id)))
            .header(AUTHORIZATION, format!("Bot {}", token))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<DiscordGuildRole>>()
            .await?;
        Ok(roles)
    }
}
