/// Identity attached to authenticated requests
use serde::{Deserialize, Serialize};

use super::authorization::{has_any_role, has_permission};
use crate::models::user::User;

/// The signed-in user as seen by handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: Option<String>,
}

impl AuthUser {
    pub fn has_any_role(&self, allowed: &[&str]) -> bool {
        has_any_role(self.role.as_deref(), allowed)
    }

    pub fn has_permission(&self, resource: &str, actions: &[&str]) -> bool {
        has_permission(self.role.as_deref(), resource, actions)
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
            role: user.role.clone(),
        }
    }
}
