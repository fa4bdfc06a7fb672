/// Middleware modules for the API server
///
/// - Session authentication
/// - Role and permission gates

pub mod auth;
