use serde::Serialize;
use tracing::instrument;

use securecloud_core::error::Error;
use securecloud_core::models::{FilterOptions, Page, User, UserRole};

use crate::gateway::Gateway;

use super::segment;

/// An account to create.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Partial user update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize)]
struct RoleRequest {
    role: UserRole,
}

#[derive(Serialize)]
struct PermissionsRequest<'a> {
    permissions: &'a [String],
}

/// `/users` endpoints.
pub struct Users<'a> {
    gateway: &'a Gateway,
}

impl<'a> Users<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, filters: &FilterOptions) -> Result<Page<User>, Error> {
        self.gateway.get_with("users", filters).await
    }

    pub async fn get(&self, id: &str) -> Result<User, Error> {
        let id = segment("user id", id)?;
        self.gateway.get(&format!("users/{}", id)).await
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&self, user: &NewUser) -> Result<User, Error> {
        self.gateway.post("users", user).await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<User, Error> {
        let id = segment("user id", id)?;
        self.gateway.put(&format!("users/{}", id), update).await
    }

    #[instrument(skip(self))]
    pub async fn update_role(&self, id: &str, role: UserRole) -> Result<User, Error> {
        let id = segment("user id", id)?;
        self.gateway
            .patch(&format!("users/{}/role", id), &RoleRequest { role })
            .await
    }

    /// Replace the user's permission list.
    #[instrument(skip(self, permissions), fields(count = permissions.len()))]
    pub async fn update_permissions(
        &self,
        id: &str,
        permissions: &[String],
    ) -> Result<User, Error> {
        let id = segment("user id", id)?;
        self.gateway
            .patch(
                &format!("users/{}/permissions", id),
                &PermissionsRequest { permissions },
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let id = segment("user id", id)?;
        self.gateway.delete(&format!("users/{}", id)).await
    }
}
