//! Error types for the idle-user-disabler application.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Identity domain error: {0}")]
    Identity(#[from] IdentityError),
}

/// Credential acquisition errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No credentials configured: {0}")]
    MissingCredentials(String),

    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),
}

/// Errors raised by identity domain calls.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Unauthorized (401): token may be expired")]
    Unauthorized,

    #[error("Forbidden (403): insufficient permissions")]
    Forbidden,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Rate limited (429): too many requests")]
    RateLimited,

    #[error("Status update rejected: {0}")]
    UpdateFailed(String),

    #[error("User {0} is still active after the status update")]
    StillActive(String),
}

impl IdentityError {
    /// Returns a user-friendly message for display in the report.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Network error. Check your connection.",
            Self::InvalidResponse(_) => "Unexpected response from the identity domain.",
            Self::Unauthorized => "Session expired or token invalid.",
            Self::Forbidden => "Insufficient permissions for this operation.",
            Self::NotFound(_) => "User no longer exists in the identity domain.",
            Self::RateLimited => "Too many requests. Throttled by the identity domain.",
            Self::UpdateFailed(_) => "The identity domain rejected the status change.",
            Self::StillActive(_) => "The identity domain still reports the user as active.",
        }
    }

    /// Returns true if this error means no further call can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

impl AppError {
    /// Returns a user-friendly message for display on stderr.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Auth(AuthError::MissingCredentials(_)) => {
                "No credentials found. Set IDCS_ACCESS_TOKEN or IDCS_CLIENT_ID/IDCS_CLIENT_SECRET."
            }
            Self::Auth(_) => "Could not obtain an access token for the identity domain.",
            Self::Identity(e) => e.user_message(),
        }
    }
}
