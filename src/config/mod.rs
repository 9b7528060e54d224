//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseConfig, LogFormat, LoggingConfig, ResolvedSecret,
    ServerConfig, INSECURE_FALLBACK_SECRET, IN_MEMORY_DATABASE_URL, JWT_SECRET_ENV, MAX_TOKEN_TTL_HOURS,
};
