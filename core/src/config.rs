//! Credentials and client configuration.
//!
//! # Design
//! Configuration is an immutable value handed to `DocuSignClient::new`.
//! There is no process-wide config object; `from_env` is a convenience that
//! reads the environment once and returns a plain `ClientConfig`.

use std::fmt;
use std::time::Duration;

use crate::error::{DocuSignError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://demo.docusign.net/restapi";
pub const DEFAULT_API_VERSION: &str = "v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Legacy header-based DocuSign credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub integrator_key: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        integrator_key: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            integrator_key: integrator_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("integrator_key", &self.integrator_key)
            .finish()
    }
}

/// Everything a `DocuSignClient` needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_version: String,
    pub credentials: Credentials,
    /// Pre-resolved account id. When absent the client looks it up once.
    pub account_id: Option<String>,
    pub timeout: Duration,
    /// Skip TLS certificate verification. Off unless explicitly enabled.
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            credentials,
            account_id: None,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Read configuration from `DOCUSIGN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DocuSignError::Configuration(format!("{key} is not set")))
        };

        let credentials = Credentials::new(
            required("DOCUSIGN_USERNAME")?,
            required("DOCUSIGN_PASSWORD")?,
            required("DOCUSIGN_INTEGRATOR_KEY")?,
        );
        let endpoint = lookup("DOCUSIGN_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let mut config = ClientConfig::new(endpoint, credentials);
        if let Some(version) = lookup("DOCUSIGN_API_VERSION") {
            config.api_version = version;
        }
        config.account_id = lookup("DOCUSIGN_ACCOUNT_ID").filter(|v| !v.is_empty());
        if let Some(raw) = lookup("DOCUSIGN_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                DocuSignError::Configuration(format!("DOCUSIGN_TIMEOUT_SECS is not a number: {raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("DOCUSIGN_ACCEPT_INVALID_CERTS") {
            config.accept_invalid_certs = parse_flag("DOCUSIGN_ACCEPT_INVALID_CERTS", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce an authenticated TLS request.
    pub fn validate(&self) -> Result<()> {
        let creds = &self.credentials;
        for (field, value) in [
            ("username", &creds.username),
            ("password", &creds.password),
            ("integrator key", &creds.integrator_key),
            ("endpoint", &self.endpoint),
            ("API version", &self.api_version),
        ] {
            if value.trim().is_empty() {
                return Err(DocuSignError::Configuration(format!("{field} is empty")));
            }
        }

        if self.endpoint.starts_with("https://") {
            return Ok(());
        }
        if let Some(rest) = self.endpoint.strip_prefix("http://") {
            let authority = rest.split('/').next().unwrap_or_default();
            let host = match authority.rfind(':') {
                Some(idx) if !authority.ends_with(']') => &authority[..idx],
                _ => authority,
            };
            if LOOPBACK_HOSTS.contains(&host) {
                return Ok(());
            }
        }
        Err(DocuSignError::Configuration(format!(
            "endpoint must use https: {}",
            self.endpoint
        )))
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DocuSignError::Configuration(format!(
            "{key} must be a boolean (true/false, 1/0, yes/no, on/off), got {raw:?}"
        ))),
    }
}
