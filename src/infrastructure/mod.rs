//! Infrastructure layer - stores, crypto and process-level setup

pub mod auth;
pub mod logging;
pub mod storage;
pub mod user;
