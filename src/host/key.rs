use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::ErrorKind;
use crate::types::Result;

/// A type-safe representation of a hostname for connection accounting.
///
/// This extracts and normalizes hostnames from URLs so that requests to the
/// same host (domain or IP address) share one connection budget.
///
/// # Examples
///
/// ```
/// use fetchgate::host::HostKey;
/// use url::Url;
///
/// let url = Url::parse("https://API.example.com/feeds/atom.xml").unwrap();
/// let host_key = HostKey::try_from(&url).unwrap();
/// assert_eq!(host_key.as_str(), "api.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HostKey(String);

impl HostKey {
    /// Get the hostname as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&Url> for HostKey {
    type Error = ErrorKind;

    fn try_from(url: &Url) -> Result<Self> {
        let host = url.host_str().ok_or(ErrorKind::InvalidUrlHost)?;
        Ok(HostKey::from(host))
    }
}

impl TryFrom<&crate::Uri> for HostKey {
    type Error = ErrorKind;

    fn try_from(uri: &crate::Uri) -> Result<Self> {
        Self::try_from(&uri.url)
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for HostKey {
    fn from(host: String) -> Self {
        HostKey(host.to_lowercase())
    }
}

impl From<HostKey> for String {
    fn from(host: HostKey) -> Self {
        host.0
    }
}

impl From<&str> for HostKey {
    fn from(host: &str) -> Self {
        HostKey(host.to_lowercase())
    }
}
