//! Identity domain data models.

use serde::{Deserialize, Serialize};

/// A user as listed by the identity domain.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Opaque unique identifier (the user's OCID).
    pub id: String,

    /// Login name.
    pub name: String,

    /// Provider-side enabled flag at fetch time.
    pub is_active: bool,

    /// Raw last successful login timestamp, absent if the user never logged in.
    pub last_successful_login: Option<String>,

    /// Creation timestamp as reported by the provider.
    pub created_at: Option<String>,

    /// Owning identity domain.
    pub domain_id: Option<String>,
}

/// Provider state returned by a status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    /// Provider-confirmed active flag after the update.
    pub active: bool,

    /// When the provider last modified the user.
    pub last_modified: Option<String>,
}

// --- SCIM wire types ---

/// Schema URN for the user status changer resource.
pub(crate) const STATUS_CHANGER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:oracle:idcs:UserStatusChanger";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserListResponse {
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(rename = "Resources", default)]
    pub resources: Vec<ScimUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScimUser {
    pub id: String,
    #[serde(default)]
    pub ocid: Option<String>,
    pub user_name: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub domain_ocid: Option<String>,
    #[serde(default)]
    pub meta: Option<ScimMeta>,
    #[serde(
        rename = "urn:ietf:params:scim:schemas:oracle:idcs:extension:userState:User",
        default
    )]
    pub user_state: Option<UserStateExtension>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScimMeta {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserStateExtension {
    #[serde(default)]
    pub previous_successful_login_date: Option<String>,
}

impl From<ScimUser> for UserRecord {
    fn from(user: ScimUser) -> Self {
        Self {
            id: user.ocid.unwrap_or(user.id),
            name: user.user_name,
            is_active: user.active.unwrap_or(false),
            last_successful_login: user
                .user_state
                .and_then(|s| s.previous_successful_login_date),
            created_at: user.meta.and_then(|m| m.created),
            domain_id: user.domain_ocid,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusChangeRequest {
    pub schemas: Vec<String>,
    pub active: bool,
}

impl StatusChangeRequest {
    pub fn new(active: bool) -> Self {
        Self {
            schemas: vec![STATUS_CHANGER_SCHEMA.to_string()],
            active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeResponse {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub meta: Option<ScimMeta>,
}

impl StatusChangeResponse {
    pub fn into_status_change(self, requested: bool) -> StatusChange {
        StatusChange {
            // Some tenants omit the flag from the echo; fall back to what was requested
            active: self.active.unwrap_or(requested),
            last_modified: self.meta.and_then(|m| m.last_modified),
        }
    }
}
