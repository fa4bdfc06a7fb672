/// Database models for Taskboard
///
/// Each model carries its own PostgreSQL CRUD operations.
///
/// # Models
///
/// - `project`: Projects and their task lists
/// - `task`: Tasks belonging to a project
/// - `user`: User accounts
/// - `session`: Login sessions backing the session cookie
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     name: "Roadmap".to_string(),
///     description: Some("Next quarter".to_string()),
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub mod project;
pub mod session;
pub mod task;
pub mod user;

/// Builds an `ILIKE` pattern matching `needle` anywhere in the column
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_needle() {
        assert_eq!(contains_pattern("proj"), "%proj%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }
}
