use std::fmt;

use serde::Deserialize;

use crate::domain::DomainError;

/// Environment variable that takes priority over any configured signing secret
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Well-known secret used only when `auth.allow_insecure_secret` is set
pub const INSECURE_FALLBACK_SECRET: &str = "secret";

/// Longest accepted session lifetime (ten years)
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365 * 10;

/// `database.url` value selecting the in-memory user store
pub const IN_MEMORY_DATABASE_URL: &str = "memory";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests still running after this many seconds are cancelled
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, or `memory` for the in-memory store
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: u64,
    pub allow_insecure_secret: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://members.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url == IN_MEMORY_DATABASE_URL
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 72,
            allow_insecure_secret: false,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = match &self.jwt_secret {
            Some(_) => "[hidden]",
            None if self.allow_insecure_secret => "insecure",
            None => "unset",
        };

        f.debug_struct("AuthConfig")
            .field("jwt_secret", &secret)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("allow_insecure_secret", &self.allow_insecure_secret)
            .finish()
    }
}

/// Signing secret chosen at startup
#[derive(Clone)]
pub struct ResolvedSecret {
    pub value: String,
    /// True when the well-known fallback is in use
    pub insecure: bool,
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.insecure {
            write!(f, "ResolvedSecret(insecure)")
        } else {
            write!(f, "ResolvedSecret([hidden])")
        }
    }
}

impl AuthConfig {
    /// Pick the signing secret, refusing to fall back silently
    pub fn resolve_secret(&self) -> Result<ResolvedSecret, DomainError> {
        match self.jwt_secret.as_deref() {
            Some("") => Err(DomainError::configuration(
                "auth.jwt_secret must not be empty",
            )),
            Some(secret) => Ok(ResolvedSecret {
                value: secret.to_string(),
                insecure: false,
            }),
            None if self.allow_insecure_secret => Ok(ResolvedSecret {
                value: INSECURE_FALLBACK_SECRET.to_string(),
                insecure: true,
            }),
            None => Err(DomainError::configuration(format!(
                "No signing secret configured; set {} or auth.allow_insecure_secret",
                JWT_SECRET_ENV
            ))),
        }
    }
}

impl AuthConfig {
    /// Session lifetime, rejecting zero and anything past [`MAX_TOKEN_TTL_HOURS`]
    pub fn token_ttl(&self) -> Result<u64, DomainError> {
        match self.token_ttl_hours {
            0 => Err(DomainError::configuration("auth.token_ttl_hours must be positive")),
            hours if hours > MAX_TOKEN_TTL_HOURS => Err(DomainError::configuration(format!(
                "auth.token_ttl_hours must be at most {}, got {}",
                MAX_TOKEN_TTL_HOURS, hours
            ))),
            hours => Ok(hours),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt_secret", std::env::var(JWT_SECRET_ENV).ok())?
            .build()?;

        config.try_deserialize()
    }
}
