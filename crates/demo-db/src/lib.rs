//! Demo connector database: embedded SurrealDB connection management,
//! schema migrations, seed data and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`], [`DbEngine`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - One-time demo data population ([`seed`])
//! - Repository implementations of the `demo-core` traits
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;
pub mod seed;

pub use connection::{DbConfig, DbEngine, DbManager};
pub use error::DbError;
pub use repository::verify_password;
pub use schema::run_migrations;
