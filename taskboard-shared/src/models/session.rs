/// Session model and database operations
///
/// The cookie carries a random token; only its SHA-256 hash is stored.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id TEXT PRIMARY KEY,
///     token_hash TEXT NOT NULL UNIQUE,
///     user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     ip_address TEXT,
///     user_agent TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,

    /// Hex SHA-256 of the cookie token
    #[serde(skip_serializing, default)]
    pub token_hash: String,

    pub user_id: String,

    pub expires_at: DateTime<Utc>,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a session
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Inserts a new session
    pub async fn create(pool: &PgPool, data: CreateSession) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, token_hash, user_id, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, token_hash, user_id, expires_at, ip_address, user_agent,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(data.token_hash)
        .bind(data.user_id)
        .bind(data.expires_at)
        .bind(data.ip_address)
        .bind(data.user_agent)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by token hash, expired or not
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token_hash, user_id, expires_at, ip_address, user_agent,
                   created_at, updated_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Deletes the session with the given token hash
    pub async fn delete_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes all sessions that expired before `now`
    pub async fn delete_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4().to_string(),
            token_hash: "abc".to_string(),
            user_id: "u1".to_string(),
            expires_at,
            ip_address: None,
            user_agent: Some("curl/8".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!session(now + Duration::minutes(5)).is_expired_at(now));
        assert!(session(now).is_expired_at(now));
        assert!(session(now - Duration::minutes(5)).is_expired_at(now));
    }

    #[test]
    fn test_token_hash_not_serialized() {
        let json = serde_json::to_value(session(Utc::now())).unwrap();
        assert!(json.get("tokenHash").is_none());
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["userAgent"], "curl/8");
    }
}
