//! OAuth2 client-credentials flow against the identity domain token endpoint.

use crate::error::AuthError;
use std::time::Duration;
use url::Url;
use zeroize::Zeroizing;

/// Token endpoint path, relative to the domain endpoint.
const TOKEN_PATH: &str = "oauth2/v1/token";

/// OAuth2 client for a confidential application registered in the domain.
pub struct OAuth2Client {
    client_id: String,
    client_secret: Zeroizing<String>,
    token_endpoint: Url,
    scope: String,
    http_client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new OAuth2 client for the domain at `endpoint`.
    pub fn new(
        endpoint: &Url,
        client_id: String,
        client_secret: Zeroizing<String>,
        scope: String,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

        let token_endpoint = endpoint
            .join(TOKEN_PATH)
            .map_err(|e| AuthError::TokenRequestFailed(format!("Invalid token URL: {}", e)))?;

        Ok(Self {
            client_id,
            client_secret,
            token_endpoint,
            scope,
            http_client,
        })
    }

    /// Token endpoint this client posts to.
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// Request an access token with the client-credentials grant.
    pub async fn client_credentials_token(&self) -> Result<TokenResponse, AuthError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        tracing::debug!("Requesting access token from {}", self.token_endpoint());

        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .basic_auth(&self.client_id, Some(self.client_secret.as_str()))
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // Log error details for debugging (doesn't expose to user)
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed: HTTP {} - {}", status, error_body);
            return Err(AuthError::TokenRequestFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        if token_response.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse(
                "empty access_token".to_string(),
            ));
        }

        tracing::info!(
            "Access token acquired, expires in {} seconds",
            token_response.expires_in
        );
        Ok(token_response)
    }
}

/// Token response from the identity domain.
#[derive(serde::Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
