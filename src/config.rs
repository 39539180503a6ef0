//! Configuration for a [`crate::Fetcher`], usually loaded from TOML.
//!
//! ```toml
//! max_connections = 10
//! timeout = "20s"
//!
//! [headers]
//! accept = "application/xml"
//!
//! [hosts."feeds.example.com"]
//! max_connections = 4
//! headers = { x-api-key = "secret" }
//! ```
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::host::HostKey;
use crate::{ErrorKind, Result};

/// Default number of concurrent connections per host
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;
/// Default number of redirects before a request is deemed as failed, 5.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// Default user agent, `fetchgate-<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("fetchgate/", env!("CARGO_PKG_VERSION"));

/// Per-host configuration overrides
pub type HostConfigs = HashMap<HostKey, HostConfig>;

/// Global fetch configuration; host-specific values override it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Default maximum number of concurrent connections per host
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Response timeout per request
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub allow_insecure: bool,

    /// Headers sent with every request
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_headers")]
    #[serde(serialize_with = "serialize_headers")]
    pub headers: HeaderMap,

    /// Host-specific overrides
    #[serde(default)]
    pub hosts: HostConfigs,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            user_agent: default_user_agent(),
            timeout: None,
            max_redirects: default_max_redirects(),
            allow_insecure: false,
            headers: HeaderMap::new(),
            hosts: HostConfigs::new(),
        }
    }
}

const fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

const fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_user_agent() -> String {
    String::from(DEFAULT_USER_AGENT)
}

impl FetchConfig {
    /// Load the configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// configuration
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ErrorKind::ReadConfig(path.to_path_buf(), e))?;
        contents.parse()
    }

    /// Configuration for `host`, or the defaults if there is no override
    #[must_use]
    pub fn host(&self, host: &HostKey) -> HostConfig {
        self.hosts.get(host).cloned().unwrap_or_default()
    }
}

impl FromStr for FetchConfig {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Configuration for a specific host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Maximum number of concurrent connections to this host
    pub max_connections: Option<usize>,

    /// Custom headers to send with requests to this host
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_headers")]
    #[serde(serialize_with = "serialize_headers")]
    pub headers: HeaderMap,
}

impl HostConfig {
    /// Get the effective connection limit, falling back to `default`
    #[must_use]
    pub fn effective_max_connections(&self, default: usize) -> usize {
        self.max_connections.unwrap_or(default)
    }
}

/// Custom deserializer for headers from TOML config format
fn deserialize_headers<'de, D>(deserializer: D) -> std::result::Result<HeaderMap, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let map = HashMap::<String, String>::deserialize(deserializer)?;
    let mut header_map = HeaderMap::new();

    for (name, value) in map {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| serde::de::Error::custom(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(&value).map_err(|e| {
            serde::de::Error::custom(format!("Invalid header value '{value}': {e}"))
        })?;
        header_map.insert(header_name, header_value);
    }

    Ok(header_map)
}

/// Custom serializer for headers to TOML config format
fn serialize_headers<S>(headers: &HeaderMap, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let map: HashMap<String, String> = headers
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or("").to_string()))
        .collect();
    map.serialize(serializer)
}
