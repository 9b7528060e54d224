//! Member accounts API
//!
//! Email/password registration, login issuing signed session tokens, and a
//! bearer-token protected member profile.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::UserRepository;
use infrastructure::{
    auth::{Argon2Hasher, AuthService, JwtConfig, JwtService, SessionVerifier},
    storage::{connect, run_user_migrations, SqliteConfig},
    user::{InMemoryUserRepository, ProfileService, SqliteUserRepository},
};
use tracing::{info, warn};

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let secret = config.auth.resolve_secret()?;
    let token_ttl_hours = config.auth.token_ttl()?;
    if secret.insecure {
        warn!("No signing secret configured; using the insecure fallback. Do not run like this in production");
    }

    let tokens = Arc::new(JwtService::new(JwtConfig::new(
        secret.value,
        token_ttl_hours,
    )));

    let repository = create_user_repository(config).await?;

    Ok(AppState::new(
        Arc::new(AuthService::new(
            repository.clone(),
            Arc::new(Argon2Hasher::new()),
            tokens.clone(),
        )),
        Arc::new(SessionVerifier::new(tokens, repository.clone())),
        Arc::new(ProfileService::new(repository)),
    ))
}

async fn create_user_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    if config.database.is_in_memory() {
        info!("Using in-memory user store");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    info!(url = %config.database.url, "Connecting to SQLite...");
    let pool = connect(
        &SqliteConfig::new(&config.database.url).with_max_connections(config.database.max_connections),
    )
    .await?;

    let applied = run_user_migrations(&pool).await?;
    info!(applied, "User schema ready");

    Ok(Arc::new(SqliteUserRepository::new(pool)))
}
