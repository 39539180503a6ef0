use std::{fmt::Display, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ErrorKind, Result};

/// The URI of a resource to fetch.
///
/// If the scheme is `file`, the resource is opened from the local
/// filesystem. Everything else is handed to the transport.
#[derive(Clone, Debug, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uri {
    pub(crate) url: Url,
}

impl Uri {
    /// Returns the string representation of the `Uri`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_ref()
    }

    #[inline]
    #[must_use]
    /// Returns the scheme of the URI (e.g. `http` or `file`)
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    #[inline]
    #[must_use]
    /// Returns the host of the URI, if any (e.g. `example.com`)
    pub fn host_str(&self) -> Option<&str> {
        self.url.host_str()
    }

    #[inline]
    #[must_use]
    /// Check if the URI points to a local file
    pub fn is_file(&self) -> bool {
        self.scheme() == "file"
    }

    /// Convert a `file` URI into a local path
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidFilePath`] if the URI has a host
    /// other than `localhost` or is not a `file` URI at all.
    pub fn to_file_path(&self) -> Result<PathBuf> {
        if !self.is_file() {
            return Err(ErrorKind::InvalidFilePath(self.clone()));
        }
        self.url
            .to_file_path()
            .map_err(|()| ErrorKind::InvalidFilePath(self.clone()))
    }

    /// The underlying URL
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Url> for Uri {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

impl From<Uri> for Url {
    fn from(uri: Uri) -> Self {
        uri.url
    }
}

impl TryFrom<String> for Uri {
    type Error = ErrorKind;

    fn try_from(s: String) -> Result<Self> {
        Uri::try_from(s.as_str())
    }
}

impl TryFrom<&str> for Uri {
    type Error = ErrorKind;

    fn try_from(s: &str) -> Result<Self> {
        let s = s.trim();
        match Url::parse(s) {
            Ok(url) => Ok(Uri { url }),
            Err(e) => Err((s.to_owned(), e).into()),
        }
    }
}

impl Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_from_str() {
        assert!(Uri::try_from("").is_err());
        assert!(Uri::try_from("not a url").is_err());

        let uri = Uri::try_from("  https://example.com/feed.xml ").unwrap();
        assert_eq!(uri.as_str(), "https://example.com/feed.xml");
        assert_eq!(uri.host_str(), Some("example.com"));
        assert!(!uri.is_file());
    }

    #[test]
    fn test_file_uri() {
        let uri = Uri::try_from("file:///tmp/data.xml").unwrap();
        assert!(uri.is_file());
        assert_eq!(uri.host_str(), None);
        #[cfg(unix)]
        assert_eq!(uri.to_file_path().unwrap(), PathBuf::from("/tmp/data.xml"));
    }

    #[test]
    fn test_non_file_uri_has_no_path() {
        let uri = Uri::try_from("https://example.com/data.xml").unwrap();
        assert!(matches!(
            uri.to_file_path(),
            Err(ErrorKind::InvalidFilePath(_))
        ));
    }
}
