//! The identity store seam consumed by the audit engine.

use async_trait::async_trait;

use super::models::{StatusChange, UserRecord};
use crate::error::IdentityError;

/// Directory operations the audit needs.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// List every user in the domain, in the provider's order (sorted by login name).
    async fn list_users(&self) -> Result<Vec<UserRecord>, IdentityError>;

    /// Enable or disable a single user.
    async fn set_user_active(
        &self,
        user_id: &str,
        active: bool,
    ) -> Result<StatusChange, IdentityError>;
}
