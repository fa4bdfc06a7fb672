/// Cookie sessions: sign-up, sign-in, sign-out and token resolution
///
/// A session token is 32 random bytes, hex-encoded, handed to the browser in
/// the session cookie. The store only ever sees `sha256(token)`.
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskboard_shared::auth::session::{ClientInfo, SessionManager, SignUp};
/// use taskboard_shared::store::Repositories;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repos = Repositories::in_memory();
/// let sessions = SessionManager::new(repos.auth.clone(), Duration::days(7));
///
/// let issued = sessions
///     .sign_up(
///         SignUp {
///             email: "ada@example.com".to_string(),
///             password: "correct horse".to_string(),
///             name: "Ada".to_string(),
///             image: None,
///         },
///         ClientInfo::default(),
///     )
///     .await?;
///
/// let resolved = sessions.resolve(&issued.token).await?;
/// assert!(resolved.is_some());
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

use super::password::{hash_password, verify_password, PasswordError};
use crate::error::StoreError;
use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::store::AuthRepo;

/// Random bytes per session token
const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists")]
    EmailTaken,

    #[error("You have been banned from this application")]
    Banned,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sign-up input, already validated
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub name: String,
    pub image: Option<String>,
}

/// Client details recorded on the session
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A freshly created session and the plaintext token for the cookie
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
    pub user: User,
}

/// A live session and its user
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSession {
    pub session: Session,
    pub user: User,
}

impl From<IssuedSession> for ResolvedSession {
    fn from(issued: IssuedSession) -> Self {
        Self {
            session: issued.session,
            user: issued.user,
        }
    }
}

/// Generates a new random session token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex-encoded SHA-256 of a session token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct SessionManager {
    auth: Arc<dyn AuthRepo>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthRepo>, ttl: Duration) -> Self {
        Self { auth, ttl }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates an account and signs it in
    pub async fn sign_up(
        &self,
        data: SignUp,
        client: ClientInfo,
    ) -> Result<IssuedSession, AuthError> {
        let password_hash = hash_password(&data.password)?;

        let user = self
            .auth
            .create_user(CreateUser {
                email: data.email,
                name: data.name,
                image: data.image,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %user.id, "User signed up");
        self.issue(user, client).await
    }

    /// Checks credentials and opens a new session
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<IssuedSession, AuthError> {
        let user = self
            .auth
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_banned_at(Utc::now()) {
            return Err(AuthError::Banned);
        }

        info!(user_id = %user.id, "User signed in");
        self.issue(user, client).await
    }

    /// Deletes the session behind `token`; unknown tokens are ignored
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        if self
            .auth
            .delete_session_by_token_hash(&hash_token(token))
            .await?
        {
            debug!("Session deleted");
        }
        Ok(())
    }

    /// Looks up the live session and user for a cookie token
    ///
    /// Unknown tokens, expired sessions and sessions whose user is gone all
    /// resolve to `None`. Expired sessions are deleted on the way.
    pub async fn resolve(&self, token: &str) -> Result<Option<ResolvedSession>, AuthError> {
        let token_hash = hash_token(token);
        let Some(session) = self.auth.find_session_by_token_hash(&token_hash).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            self.auth.delete_session_by_token_hash(&token_hash).await?;
            debug!(session_id = %session.id, "Expired session removed");
            return Ok(None);
        }

        let Some(user) = self.auth.find_user_by_id(&session.user_id).await? else {
            return Ok(None);
        };

        Ok(Some(ResolvedSession { session, user }))
    }

    /// Deletes every session that has expired; returns how many
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let removed = self.auth.delete_expired_sessions(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }

    async fn issue(&self, user: User, client: ClientInfo) -> Result<IssuedSession, AuthError> {
        let token = generate_token();
        let session = self
            .auth
            .create_session(CreateSession {
                token_hash: hash_token(&token),
                user_id: user.id.clone(),
                expires_at: Utc::now() + self.ttl,
                ip_address: client.ip_address,
                user_agent: client.user_agent,
            })
            .await?;

        Ok(IssuedSession {
            token,
            session,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn manager(ttl: Duration) -> SessionManager {
        SessionManager::new(Arc::new(MemoryStore::new()), ttl)
    }

    fn sign_up_data(email: &str) -> SignUp {
        SignUp {
            email: email.to_string(),
            password: "correct horse".to_string(),
            name: "Ada".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let hash = hash_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("abc"));
        assert_ne!(hash, hash_token("abd"));
    }

    #[tokio::test]
    async fn test_sign_up_then_resolve() {
        let sessions = manager(Duration::hours(1));
        let issued = sessions
            .sign_up(sign_up_data("ada@example.com"), ClientInfo::default())
            .await
            .unwrap();

        assert_ne!(issued.session.token_hash, issued.token);
        let resolved = sessions.resolve(&issued.token).await.unwrap().unwrap();
        assert_eq!(resolved.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let sessions = manager(Duration::hours(1));
        sessions
            .sign_up(sign_up_data("ada@example.com"), ClientInfo::default())
            .await
            .unwrap();

        let result = sessions
            .sign_up(sign_up_data("ADA@example.com"), ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_sign_in() {
        let sessions = manager(Duration::hours(1));
        sessions
            .sign_up(sign_up_data("ada@example.com"), ClientInfo::default())
            .await
            .unwrap();

        let wrong = sessions
            .sign_in("ada@example.com", "wrong password", ClientInfo::default())
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = sessions
            .sign_in("bob@example.com", "correct horse", ClientInfo::default())
            .await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

        let issued = sessions
            .sign_in("Ada@Example.com", "correct horse", ClientInfo::default())
            .await
            .unwrap();
        assert!(sessions.resolve(&issued.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_out() {
        let sessions = manager(Duration::hours(1));
        let issued = sessions
            .sign_up(sign_up_data("ada@example.com"), ClientInfo::default())
            .await
            .unwrap();

        sessions.sign_out(&issued.token).await.unwrap();
        assert!(sessions.resolve(&issued.token).await.unwrap().is_none());
        sessions.sign_out("unknown").await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let sessions = manager(Duration::seconds(-1));
        let issued = sessions
            .sign_up(sign_up_data("ada@example.com"), ClientInfo::default())
            .await
            .unwrap();

        assert!(sessions.resolve(&issued.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let sessions = manager(Duration::seconds(-1));
        sessions
            .sign_up(sign_up_data("ada@example.com"), ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(sessions.purge_expired().await.unwrap(), 1);
        assert_eq!(sessions.purge_expired().await.unwrap(), 0);
    }
}
