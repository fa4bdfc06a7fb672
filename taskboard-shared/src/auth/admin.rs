/// User moderation: role assignment and bans
///
/// Callers are expected to have checked the acting user's permissions
/// (`user:set-role`, `user:ban`) before calling in.
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

use crate::error::{Resource, ServiceError, ServiceResult};
use crate::models::user::{BanUpdate, User};
use crate::store::AuthRepo;

#[derive(Clone)]
pub struct UserAdmin {
    auth: Arc<dyn AuthRepo>,
}

impl UserAdmin {
    pub fn new(auth: Arc<dyn AuthRepo>) -> Self {
        Self { auth }
    }

    /// Replaces the user's role list; an empty list resets to the default role
    pub async fn set_role(&self, user_id: &str, roles: &[String]) -> ServiceResult<User> {
        let role = roles
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        let role = (!role.is_empty()).then_some(role);

        let user = self
            .auth
            .set_user_role(user_id, role)
            .await?
            .ok_or(ServiceError::NotFound(Resource::User))?;

        info!(user_id = %user.id, role = ?user.role, "User role changed");
        Ok(user)
    }

    /// Bans the user, forever when `expires_in` is `None`
    pub async fn ban(
        &self,
        user_id: &str,
        reason: Option<String>,
        expires_in: Option<Duration>,
    ) -> ServiceResult<User> {
        let ban = BanUpdate {
            banned: true,
            reason,
            expires: expires_in.map(|d| {
                Utc::now()
                    .checked_add_signed(d)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            }),
        };

        let user = self
            .auth
            .set_user_ban(user_id, ban)
            .await?
            .ok_or(ServiceError::NotFound(Resource::User))?;

        info!(user_id = %user.id, expires = ?user.ban_expires, "User banned");
        Ok(user)
    }

    pub async fn unban(&self, user_id: &str) -> ServiceResult<User> {
        let user = self
            .auth
            .set_user_ban(user_id, BanUpdate::lift())
            .await?
            .ok_or(ServiceError::NotFound(Resource::User))?;

        info!(user_id = %user.id, "User unbanned");
        Ok(user)
    }
}
