//! Storage infrastructure - SQLite pool and schema migrations

pub mod migrations;
mod sqlite;

pub use migrations::{run_user_migrations, user_migrations, Migration, SqliteMigrator};
pub use sqlite::{connect, SqliteConfig};
