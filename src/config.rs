//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml (or a user-supplied file of the
//! same shape) with environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use url::Url;
use zeroize::Zeroizing;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub identity: IdentityConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,

    /// Secrets never come from the file; they are filled from the environment.
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub endpoint: String,
    pub page_size: u32,
    pub http_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub token_scope: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    pub threshold_days: u32,
    pub dry_run: bool,
    pub verbose_identifiers: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Credentials read from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub access_token: Option<Zeroizing<String>>,
    pub client_id: Option<String>,
    pub client_secret: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from the embedded config.toml, or from `path` when given,
    /// then apply environment variable overrides.
    ///
    /// Validation is left to the caller so command-line overrides can be applied first.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::parse(&content)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => Self::parse(CONFIG_TOML).context("Failed to parse embedded config.toml")?,
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(endpoint) = env::var("IDCS_ENDPOINT") {
            self.identity.endpoint = endpoint;
        }

        if let Ok(days) = env::var("IDLE_THRESHOLD_DAYS") {
            self.audit.threshold_days = days
                .parse()
                .with_context(|| format!("IDLE_THRESHOLD_DAYS is not a number: {}", days))?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            self.logging.level = log_level;
        }

        self.credentials = Credentials {
            access_token: non_empty_env("IDCS_ACCESS_TOKEN").map(Zeroizing::new),
            client_id: non_empty_env("IDCS_CLIENT_ID"),
            client_secret: non_empty_env("IDCS_CLIENT_SECRET").map(Zeroizing::new),
        };

        Ok(())
    }

    /// Validate that required configuration is present and sane.
    pub fn validate(&self) -> Result<()> {
        if self.identity.endpoint.trim().is_empty() {
            anyhow::bail!(
                "Identity domain endpoint not configured. Pass --endpoint, set IDCS_ENDPOINT \
                 or update config.toml"
            );
        }

        self.endpoint_url()?;

        if self.audit.threshold_days == 0 {
            anyhow::bail!("threshold_days must be a positive number of days");
        }

        if self.identity.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero");
        }

        Ok(())
    }

    /// Parsed identity domain URL, normalized to end with a slash so relative
    /// API paths join underneath it.
    pub fn endpoint_url(&self) -> Result<Url> {
        let raw = self.identity.endpoint.trim();
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };

        let url = Url::parse(&normalized)
            .with_context(|| format!("Invalid identity domain endpoint: {}", raw))?;

        match url.scheme() {
            "https" | "http" => Ok(url),
            other => anyhow::bail!("Unsupported endpoint scheme '{}': use https", other),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.identity.http_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.identity.connect_timeout_seconds)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
