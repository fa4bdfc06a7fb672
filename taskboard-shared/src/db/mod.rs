/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: embedded schema migrations
///
/// Models and their queries live in the crate-level `models` module.
pub mod migrations;
pub mod pool;
