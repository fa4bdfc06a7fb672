/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`session`]: Session tokens and the sign-up / sign-in / sign-out flows
/// - [`authorization`]: Role and permission checks
/// - [`admin`]: Role assignment and bans
/// - [`context`]: The authenticated user handed to request handlers
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::session::{generate_token, hash_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = generate_token();
/// assert_eq!(hash_token(&token).len(), 64);
/// # Ok(())
/// # }
/// ```
pub mod admin;
pub mod authorization;
pub mod context;
pub mod password;
pub mod session;

pub use admin::UserAdmin;
pub use context::AuthUser;
pub use session::{AuthError, SessionManager};
