//! Identity domain authentication.
//!
//! Resolves a bearer token either from a pre-issued token or through the
//! OAuth2 client-credentials grant.

pub mod oauth;

use clap::ValueEnum;
use tracing::info;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::AuthError;
use oauth::OAuth2Client;

/// How the access token is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    /// Use a pre-issued bearer token from IDCS_ACCESS_TOKEN.
    Token,
    /// Request a token with IDCS_CLIENT_ID and IDCS_CLIENT_SECRET.
    ClientCredentials,
}

/// Pick a mode when none was requested: a configured token wins.
pub fn resolve_mode(requested: Option<AuthMode>, config: &Config) -> AuthMode {
    requested.unwrap_or(if config.credentials.access_token.is_some() {
        AuthMode::Token
    } else {
        AuthMode::ClientCredentials
    })
}

/// Obtain an access token for the configured identity domain.
pub async fn acquire_token(
    mode: AuthMode,
    config: &Config,
) -> Result<Zeroizing<String>, AuthError> {
    match mode {
        AuthMode::Token => {
            info!("Using pre-issued access token");
            config.credentials.access_token.clone().ok_or_else(|| {
                AuthError::MissingCredentials("IDCS_ACCESS_TOKEN is not set".to_string())
            })
        }
        AuthMode::ClientCredentials => {
            let (client_id, client_secret) = match (
                config.credentials.client_id.clone(),
                config.credentials.client_secret.clone(),
            ) {
                (Some(id), Some(secret)) => (id, secret),
                _ => {
                    return Err(AuthError::MissingCredentials(
                        "IDCS_CLIENT_ID and IDCS_CLIENT_SECRET must both be set".to_string(),
                    ))
                }
            };

            let endpoint = config
                .endpoint_url()
                .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

            let client = OAuth2Client::new(
                &endpoint,
                client_id,
                client_secret,
                config.identity.token_scope.clone(),
                config.http_timeout(),
                config.connect_timeout(),
            )?;

            let token = client.client_credentials_token().await?;
            Ok(Zeroizing::new(token.access_token))
        }
    }
}
