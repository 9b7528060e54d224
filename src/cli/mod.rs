//! CLI module for the member accounts service
//!
//! - `serve`: run the HTTP API
//! - `migrate`: bootstrap the database schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Member accounts API - registration, login and bearer-token protected profiles
#[derive(Parser)]
#[command(name = "member-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending schema migrations and exit
    Migrate,
}

/// Load `.env`, layered configuration and the tracing subscriber
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
