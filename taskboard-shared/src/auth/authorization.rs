/// Role and permission checks
///
/// Roles come from the user's comma-separated `role` column (missing means
/// `user`). Permissions are a static table of role → resource → actions:
/// `admin` may manage users and sessions, `user` may not.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{has_any_role, has_permission};
///
/// assert!(has_any_role(Some("admin,user"), &["admin"]));
/// assert!(has_any_role(None, &["user"]));
/// assert!(has_permission(Some("admin"), "user", &["ban"]));
/// assert!(!has_permission(None, "user", &["ban"]));
/// ```
use crate::models::user::DEFAULT_ROLE;

/// Administrator role
pub const ADMIN_ROLE: &str = "admin";

/// Actions on user accounts
pub const USER_ACTIONS: &[&str] = &[
    "create",
    "list",
    "set-role",
    "ban",
    "impersonate",
    "delete",
    "set-password",
    "get",
    "update",
];

/// Actions on sessions
pub const SESSION_ACTIONS: &[&str] = &["list", "revoke", "delete"];

/// Statements granted to a role: `(resource, actions)`
fn statements(role: &str) -> &'static [(&'static str, &'static [&'static str])] {
    match role {
        ADMIN_ROLE => &[("user", USER_ACTIONS), ("session", SESSION_ACTIONS)],
        _ => &[],
    }
}

/// Splits a role column into trimmed role names, defaulting to `user`
pub fn parse_roles(role: Option<&str>) -> Vec<&str> {
    let roles: Vec<&str> = role
        .unwrap_or(DEFAULT_ROLE)
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();

    if roles.is_empty() {
        vec![DEFAULT_ROLE]
    } else {
        roles
    }
}

/// Whether the user holds at least one of `allowed`
pub fn has_any_role(role: Option<&str>, allowed: &[&str]) -> bool {
    parse_roles(role).iter().any(|r| allowed.contains(r))
}

/// Whether some role of the user grants every action on `resource`
pub fn has_permission(role: Option<&str>, resource: &str, actions: &[&str]) -> bool {
    parse_roles(role).iter().any(|r| {
        statements(r)
            .iter()
            .find(|(res, _)| *res == resource)
            .is_some_and(|(_, granted)| actions.iter().all(|a| granted.contains(a)))
    })
}
