use serde::{Deserialize, Serialize};
use url::Url;

use crate::{BasicAuthCredentials, ErrorKind, Result};

/// An explicit proxy to route a fetch through.
///
/// Requests without a proxy use the environment's proxy settings,
/// as picked up by `reqwest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.internal:3128`
    pub url: Url,

    /// Credentials presented to the proxy
    #[serde(default)]
    pub credentials: Option<BasicAuthCredentials>,
}

impl ProxyConfig {
    /// Create a proxy configuration without credentials
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
        }
    }

    /// Attach credentials for the proxy
    #[must_use]
    pub fn with_credentials(mut self, credentials: BasicAuthCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Convert into a proxy understood by `reqwest`, proxying all schemes
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(self.url.as_str())
            .map_err(|e| ErrorKind::InvalidProxy(self.url.clone(), e))?;

        Ok(match &self.credentials {
            Some(credentials) => proxy.basic_auth(&credentials.username, &credentials.password),
            None => proxy,
        })
    }
}

impl TryFrom<&str> for ProxyConfig {
    type Error = ErrorKind;

    fn try_from(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| ErrorKind::ParseUrl(url.to_owned(), e))?;
        Ok(Self::new(parsed))
    }
}
