/// User model and database operations
///
/// Users sign up with e-mail and password. Roles and bans are set by admins
/// and read on every authenticated request.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id TEXT PRIMARY KEY,
///     email TEXT NOT NULL,            -- unique on LOWER(email)
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     name TEXT NOT NULL,
///     image TEXT,
///     role TEXT,                      -- comma-separated, NULL means "user"
///     banned BOOLEAN NOT NULL DEFAULT FALSE,
///     ban_reason TEXT,
///     ban_expires TIMESTAMPTZ,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "ada@example.com".to_string(),
///     name: "Ada".to_string(),
///     image: None,
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "ADA@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::authorization::parse_roles;

/// Role assumed for users without an explicit role
pub const DEFAULT_ROLE: &str = "user";

/// User account
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// E-mail address, unique ignoring case
    pub email: String,

    pub email_verified: bool,

    /// Display name
    pub name: String,

    /// Avatar URL
    pub image: Option<String>,

    /// Comma-separated role list
    pub role: Option<String>,

    pub banned: bool,

    pub ban_reason: Option<String>,

    /// When the ban lifts; `None` means never
    pub ban_expires: Option<DateTime<Utc>>,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub image: Option<String>,

    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Ban state written by an admin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanUpdate {
    pub banned: bool,
    pub reason: Option<String>,

    /// `None` bans forever (or clears the expiry when unbanning)
    pub expires: Option<DateTime<Utc>>,
}

impl BanUpdate {
    pub fn lift() -> Self {
        Self::default()
    }
}

impl User {
    /// Roles held by the user, falling back to [`DEFAULT_ROLE`]
    pub fn roles(&self) -> Vec<&str> {
        parse_roles(self.role.as_deref())
    }

    /// Whether the ban is in force at `now`
    ///
    /// A ban without an expiry never lifts.
    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        self.banned && self.ban_expires.map_or(true, |expires| expires > now)
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the e-mail is taken (any case).
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, image, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, email_verified, name, image, role, banned,
                      ban_reason, ban_expires, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(data.email)
        .bind(data.name)
        .bind(data.image)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, email_verified, name, image, role, banned,
                   ban_reason, ban_expires, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by e-mail, ignoring case
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, email_verified, name, image, role, banned,
                   ban_reason, ban_expires, password_hash, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the role list; `None` if the user does not exist
    pub async fn set_role(
        pool: &PgPool,
        id: &str,
        role: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, email_verified, name, image, role, banned,
                      ban_reason, ban_expires, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Sets or lifts a ban; `None` if the user does not exist
    pub async fn set_ban(
        pool: &PgPool,
        id: &str,
        ban: BanUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET banned = $2, ban_reason = $3, ban_expires = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, email_verified, name, image, role, banned,
                      ban_reason, ban_expires, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(ban.banned)
        .bind(ban.reason)
        .bind(ban.expires)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
