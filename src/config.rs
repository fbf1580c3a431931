//! Configuration management for the DutyCalls module.
//!
//! Two sources feed configuration:
//!
//! - [`Credentials`] arrive from the host in a module-conf package and are
//!   held by the [`CredentialStore`].
//! - [`Settings`] are process-level knobs loaded from environment variables.

use std::env;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::BridgeError;

/// Address used when the conf package carries no `uri`.
pub const DEFAULT_URI: &str = "https://dutycalls.me/api";

/// Environment variable holding an optional HTTP timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "DUTYCALLS_HTTP_TIMEOUT_SECS";

/// Base address and basic-auth credentials for the DutyCalls API.
///
/// The password must never be logged; the `Debug` impl redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login for HTTP basic authentication.
    pub login: String,

    /// Password for HTTP basic authentication.
    pub password: String,

    /// Base address of the API (e.g., `https://dutycalls.me/api`).
    pub uri: String,
}

/// Wire shape of the module-conf payload.
#[derive(Deserialize)]
struct ConfPayload {
    login: String,
    password: String,
    #[serde(default)]
    uri: Option<String>,
}

impl Credentials {
    /// Decodes a module-conf payload and validates it.
    ///
    /// An empty `uri` is replaced with [`DEFAULT_URI`].
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Config` if the payload does not decode or the
    /// address is not a usable base URL.
    pub fn from_msgpack(data: &[u8]) -> Result<Self, BridgeError> {
        let conf: ConfPayload = rmp_serde::from_slice(data).map_err(|e| {
            BridgeError::invalid_config(format!(
                "missing or invalid DutyCalls configuration ({})",
                e
            ))
        })?;

        let uri = match conf.uri {
            Some(uri) if !uri.trim().is_empty() => uri,
            _ => DEFAULT_URI.to_string(),
        };
        Self::validate_uri(&uri)?;

        Ok(Credentials {
            login: conf.login,
            password: conf.password,
            uri,
        })
    }

    /// Parses the base address into a URL that can carry a path.
    pub fn base_url(&self) -> Result<Url, BridgeError> {
        Self::validate_uri(&self.uri)
            .map_err(|_| BridgeError::bad_data(format!("failed to parse URI ({})", self.uri)))
    }

    fn validate_uri(uri: &str) -> Result<Url, BridgeError> {
        let url = Url::parse(uri)
            .map_err(|e| BridgeError::invalid_config(format!("invalid uri {:?} ({})", uri, e)))?;

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(BridgeError::invalid_config(format!(
                "uri must be an http:// or https:// address, got {:?}",
                uri
            )));
        }

        Ok(url)
    }
}

impl Default for Credentials {
    /// Credentials in effect before the host sends a configuration.
    fn default() -> Self {
        Self {
            login: String::new(),
            password: String::new(),
            uri: DEFAULT_URI.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("uri", &self.uri)
            .finish()
    }
}

/// Shared holder of the most recently accepted [`Credentials`].
///
/// Updates replace the whole value under a write lock, so a reader always
/// sees either the previous or the new credentials, never a mix.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credentials>>,
}

impl CredentialStore {
    /// Creates a store holding the default (unconfigured) credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a module-conf payload and, if valid, replaces the held credentials.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Config` on an invalid payload; the previously
    /// held credentials stay in place.
    pub fn configure(&self, data: &[u8]) -> Result<(), BridgeError> {
        let creds = Credentials::from_msgpack(data)?;
        self.replace(creds);
        Ok(())
    }

    /// Atomically replaces the held credentials.
    pub fn replace(&self, creds: Credentials) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = creds;
    }

    /// Returns a snapshot of the current credentials.
    pub fn current(&self) -> Credentials {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Process-level settings loaded from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Optional timeout for outbound HTTP calls. `None` leaves the call
    /// bounded only by the transport.
    pub http_timeout: Option<Duration>,
}

impl Settings {
    /// Loads settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, BridgeError> {
        let http_timeout = match env::var(HTTP_TIMEOUT_ENV) {
            Ok(value) if !value.trim().is_empty() => Some(Self::parse_timeout(&value)?),
            _ => None,
        };

        Ok(Settings { http_timeout })
    }

    fn parse_timeout(value: &str) -> Result<Duration, BridgeError> {
        let secs: u64 = value.trim().parse().map_err(|_| {
            BridgeError::invalid_config(format!(
                "{} must be a whole number of seconds",
                HTTP_TIMEOUT_ENV
            ))
        })?;

        if secs == 0 {
            return Err(BridgeError::invalid_config(format!(
                "{} must be greater than zero",
                HTTP_TIMEOUT_ENV
            )));
        }

        Ok(Duration::from_secs(secs))
    }
}
