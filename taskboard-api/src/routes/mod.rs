/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Sign-up, sign-in, sign-out, session lookup and user moderation
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
