//! User infrastructure module
//!
//! Store implementations for user records and the profile service built on
//! top of them.

mod repository;
mod service;
mod sqlite_repository;

pub use repository::InMemoryUserRepository;
pub use service::ProfileService;
pub use sqlite_repository::SqliteUserRepository;
