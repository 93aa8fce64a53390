//! Configuration types for the reconciler
//!
//! [`ReconcilerConfig`] is the construction-time surface: API credentials plus
//! pacing and confirmation settings. It can be built in code, read from the
//! environment, or loaded from a JSON document. Nothing is usable until
//! [`ReconcilerConfig::validate`] passes.

use std::env;
use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rate_limit::DEFAULT_REQUESTS_PER_SECOND;

/// Environment variable holding the primary account `auth-id`
pub const ENV_AUTH_ID: &str = "CLOUDNS_AUTH_ID";

/// Environment variable holding the sub-account `sub-auth-id`
pub const ENV_SUB_AUTH_ID: &str = "CLOUDNS_SUB_AUTH_ID";

/// Environment variable holding the API password
pub const ENV_PASSWORD: &str = "CLOUDNS_PASSWORD";

/// Environment variable overriding the request rate
pub const ENV_REQUESTS_PER_SECOND: &str = "CLOUDNS_REQUESTS_PER_SECOND";

/// Reconciler configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Primary account id (mutually exclusive with `sub_auth_id`)
    #[serde(default)]
    pub auth_id: Option<u64>,

    /// Sub-account id (mutually exclusive with `auth_id`)
    #[serde(default)]
    pub sub_auth_id: Option<u64>,

    /// API password for whichever identity is set
    #[serde(default)]
    pub password: Option<String>,

    /// Ceiling on outbound API calls per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// How long a created record may take to show up in the zone listing
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    /// First delay between confirmation polls (in milliseconds)
    #[serde(default = "default_poll_initial_interval_ms")]
    pub poll_initial_interval_ms: u64,

    /// Upper bound on the delay between confirmation polls (in milliseconds)
    #[serde(default = "default_poll_max_interval_ms")]
    pub poll_max_interval_ms: u64,
}

impl ReconcilerConfig {
    /// Create a configuration with defaults and no credentials
    pub fn new() -> Self {
        Self {
            auth_id: None,
            sub_auth_id: None,
            password: None,
            requests_per_second: default_requests_per_second(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            poll_initial_interval_ms: default_poll_initial_interval_ms(),
            poll_max_interval_ms: default_poll_max_interval_ms(),
        }
    }

    /// Configuration for a primary account
    pub fn primary(auth_id: u64, password: impl Into<String>) -> Self {
        Self {
            auth_id: Some(auth_id),
            password: Some(password.into()),
            ..Self::new()
        }
    }

    /// Configuration for a sub-account
    pub fn sub_account(sub_auth_id: u64, password: impl Into<String>) -> Self {
        Self {
            sub_auth_id: Some(sub_auth_id),
            password: Some(password.into()),
            ..Self::new()
        }
    }

    /// Set the request rate
    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    /// Set the confirmation timeout
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout_secs = timeout.as_secs();
        self
    }

    /// Load configuration from environment variables
    ///
    /// Unset, empty or zero ids count as absent. An unset or empty rate keeps
    /// the default. Values that are present but not numbers are configuration
    /// errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        config.auth_id = env_u64(ENV_AUTH_ID)?.filter(|id| *id != 0);
        config.sub_auth_id = env_u64(ENV_SUB_AUTH_ID)?.filter(|id| *id != 0);
        config.password = env::var(ENV_PASSWORD).ok().filter(|p| !p.is_empty());

        // Zero is kept so that validate() rejects it
        if let Some(rate) = env_u64(ENV_REQUESTS_PER_SECOND)? {
            config.requests_per_second = u32::try_from(rate).map_err(|_| {
                Error::config(format!("{ENV_REQUESTS_PER_SECOND} is too large: {rate}"))
            })?;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;

        if self.requests_per_second == 0 {
            return Err(Error::config("requests_per_second must be at least 1"));
        }

        if self.confirmation_timeout_secs == 0 {
            return Err(Error::config("confirmation_timeout_secs must be at least 1"));
        }

        if self.poll_initial_interval_ms == 0 {
            return Err(Error::config("poll_initial_interval_ms must be at least 1"));
        }

        if self.poll_initial_interval_ms > self.poll_max_interval_ms {
            return Err(Error::config(format!(
                "poll_initial_interval_ms ({}) cannot exceed poll_max_interval_ms ({})",
                self.poll_initial_interval_ms, self.poll_max_interval_ms
            )));
        }

        Ok(())
    }

    /// Resolve the credentials
    ///
    /// Exactly one of `auth_id` or `sub_auth_id` must be set (zero counts as
    /// unset) and the password must be non-empty.
    pub fn credentials(&self) -> Result<Credentials> {
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::config("Expected password to be defined but it wasn't"))?;

        let auth_id = self.auth_id.filter(|id| *id != 0);
        let sub_auth_id = self.sub_auth_id.filter(|id| *id != 0);

        let identity = match (auth_id, sub_auth_id) {
            (Some(id), None) => AuthIdentity::Primary(id),
            (None, Some(id)) => AuthIdentity::Sub(id),
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "Exactly one of auth_id or sub_auth_id must be set, but both were defined",
                ));
            }
            (None, None) => {
                return Err(Error::config(
                    "Exactly one of auth_id or sub_auth_id must be set, but both were not defined",
                ));
            }
        };

        Ok(Credentials {
            identity,
            password: password.to_string(),
        })
    }

    /// Request rate as a non-zero value
    pub fn rate(&self) -> Result<NonZeroU32> {
        NonZeroU32::new(self.requests_per_second)
            .ok_or_else(|| Error::config("requests_per_second must be at least 1"))
    }

    /// Confirmation timeout as a duration
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// First confirmation poll delay
    pub fn poll_initial_interval(&self) -> Duration {
        Duration::from_millis(self.poll_initial_interval_ms)
    }

    /// Confirmation poll delay cap
    pub fn poll_max_interval(&self) -> Duration {
        Duration::from_millis(self.poll_max_interval_ms)
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Custom Debug implementation that hides the password
impl fmt::Debug for ReconcilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcilerConfig")
            .field("auth_id", &self.auth_id)
            .field("sub_auth_id", &self.sub_auth_id)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("requests_per_second", &self.requests_per_second)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .field("poll_initial_interval_ms", &self.poll_initial_interval_ms)
            .field("poll_max_interval_ms", &self.poll_max_interval_ms)
            .finish()
    }
}

/// Which kind of API user the credentials belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthIdentity {
    /// Primary API user (`auth-id`)
    Primary(u64),
    /// API sub-user (`sub-auth-id`)
    Sub(u64),
}

/// Validated API credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account identity
    pub identity: AuthIdentity,
    /// API password
    /// ⚠️ NEVER log this value
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

fn default_requests_per_second() -> u32 {
    DEFAULT_REQUESTS_PER_SECOND
}

fn default_confirmation_timeout_secs() -> u64 {
    30
}

fn default_poll_initial_interval_ms() -> u64 {
    500
}

fn default_poll_max_interval_ms() -> u64 {
    5_000
}
