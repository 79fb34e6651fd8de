//! Configuration types for labbcat

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Path of the read-only store endpoint, relative to the base URL
pub const STORE_PATH: &str = "api/store/";
/// Path of the read/write store endpoint
pub const EDIT_STORE_PATH: &str = "api/edit/store/";
/// Path of the administration store endpoint
pub const ADMIN_STORE_PATH: &str = "api/admin/store/";

/// Basic-auth credentials
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// HTTP transport settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout, and the limit on a whole store call (default: 60 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Limit on a whole transcript upload or fragment download (default: 10 minutes)
    #[serde(default = "default_transfer_timeout", with = "duration_serde")]
    pub transfer_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            transfer_timeout: default_transfer_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Long-running task polling settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Poll interval used when the server does not advertise `refreshSeconds` (default: 2 seconds)
    #[serde(default = "default_refresh", with = "duration_serde")]
    pub default_refresh: Duration,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            default_refresh: default_refresh(),
        }
    }
}

/// Fragment download settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FragmentConfig {
    /// Directory used when a batch download names no destination (None = system temp dir)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Sample rate requested for sound fragments (None = server default)
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

/// Main configuration for a store client
///
/// Only `base_url` is required; everything else has a usable default.
///
/// ```
/// use labbcat::{Config, Credentials};
///
/// let mut config = Config::new("https://labbcat.example.org/labbcat");
/// config.credentials = Some(Credentials::new("demo", "demo"));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.store_url(), "https://labbcat.example.org/labbcat/api/store/");
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the LaBB-CAT instance, e.g. `https://example.org/labbcat/`
    pub base_url: String,

    /// Credentials for basic authentication (None = anonymous)
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Task polling settings
    #[serde(default)]
    pub tasks: TaskConfig,

    /// Fragment download settings
    #[serde(default)]
    pub fragments: FragmentConfig,
}

impl Config {
    /// Create a configuration for the given base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Check the configuration for values that can never work
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(Error::config("base_url", "base URL must not be empty"));
        }
        let parsed = url::Url::parse(base)
            .map_err(|e| Error::config("base_url", format!("invalid base URL '{}': {}", base, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "base_url",
                format!("unsupported URL scheme '{}'", parsed.scheme()),
            ));
        }
        if let Some(credentials) = &self.credentials
            && credentials.username.is_empty()
            && !credentials.password.is_empty()
        {
            return Err(Error::config(
                "credentials.username",
                "a password was given without a username",
            ));
        }
        if self.http.timeout.is_zero() {
            return Err(Error::config("http.timeout", "timeout must be non-zero"));
        }
        if self.http.transfer_timeout.is_zero() {
            return Err(Error::config(
                "http.transfer_timeout",
                "transfer timeout must be non-zero",
            ));
        }
        if self.tasks.default_refresh.is_zero() {
            return Err(Error::config(
                "tasks.default_refresh",
                "default refresh interval must be non-zero",
            ));
        }
        Ok(())
    }

    /// Base URL, always ending with `/`
    pub fn base(&self) -> String {
        let base = self.base_url.trim();
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }

    /// Resolve a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base(), path.trim_start_matches('/'))
    }

    /// Read-only store endpoint
    pub fn store_url(&self) -> String {
        self.url(STORE_PATH)
    }

    /// Read/write store endpoint
    pub fn edit_store_url(&self) -> String {
        self.url(EDIT_STORE_PATH)
    }

    /// Administration store endpoint
    pub fn admin_store_url(&self) -> String {
        self.url(ADMIN_STORE_PATH)
    }

    /// Credentials to attach, if a username is configured
    pub(crate) fn active_credentials(&self) -> Option<&Credentials> {
        self.credentials
            .as_ref()
            .filter(|c| !c.username.is_empty())
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_transfer_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_user_agent() -> String {
    format!("labbcat-client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_refresh() -> Duration {
    Duration::from_secs(2)
}

// Duration serialization helper (seconds, fractions allowed)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid duration {}: {}", secs, e)))
    }
}
