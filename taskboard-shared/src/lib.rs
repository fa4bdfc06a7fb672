//! # Taskboard Shared Library
//!
//! Domain types, storage and business logic behind the Taskboard API.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `services`: Project and task business rules
//! - `auth`: Passwords, sessions, roles and permissions
//! - `db`: Connection pool and migrations
//! - `pagination`: Page/limit arithmetic
//! - `error`: Storage and service error types

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
