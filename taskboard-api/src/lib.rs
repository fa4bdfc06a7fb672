//! # Taskboard API Server Library
//!
//! REST backend for projects and tasks with cookie-session authentication.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookie`: Session cookie parsing and `Set-Cookie` values
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating JSON and query extractors
//! - `middleware`: Session authentication, role and permission gates
//! - `response`: Success envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod cookie;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
