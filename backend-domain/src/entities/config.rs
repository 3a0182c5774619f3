// Runtime configuration entities

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
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
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            public_base_url: "http://127.0.0.1:3000".to_string(),
            metrics_token: None,
            session_secret: "change-me".to_string(),
            session_ttl_minutes: 4 * 60,
            cookie_secure: false,
            cache_ttl_seconds: 5 * 60,
            cache_cleanup_interval_seconds: 10 * 60,
            gdpr_hard_delete: false,
            bulk_import_max_bytes: 256 * 1024,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub guild_id: Option<String>,
    pub bot_token: Option<String>,
}
