use std::{convert::Infallible, path::PathBuf};
use thiserror::Error;
use url::Url;

use crate::Uri;

/// Possible errors when fetching a resource with `fetchgate`
///
/// Errors raised by the HTTP client or the filesystem are wrapped as they are
/// and never retried.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Network error while sending a request or receiving the response head.
    /// This includes responses with an error status code.
    #[error("Network error while fetching an endpoint via reqwest")]
    NetworkRequest(#[source] reqwest::Error),

    /// Cannot read the body of a response
    #[error("Error reading response body: {0}")]
    ReadResponseBody(#[source] std::io::Error),

    /// The network client required for making requests cannot be created
    #[error("Error creating request client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),

    /// The proxy URL was rejected by the request client
    #[error("Invalid proxy `{0}`: {1}")]
    InvalidProxy(Url, #[source] reqwest::Error),

    /// The given header could not be parsed.
    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice.
    #[error("Header could not be parsed.")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// Any form of I/O error occurred while opening a local file
    #[error("Failed to read from path: `{path}`, reason: {1}", path = match .0 {
        Some(p) => p.to_str().unwrap_or("<MALFORMED PATH>"),
        None => "<MALFORMED PATH>",
    })]
    IoError(Option<PathBuf>, #[source] std::io::Error),

    /// The given `file` URI cannot be converted to a local path
    #[error("Cannot convert {0} into a local file path")]
    InvalidFilePath(Uri),

    /// The given string cannot be parsed into a valid URL
    #[error("Cannot parse string `{0}` as website url: {1}")]
    ParseUrl(String, #[source] url::ParseError),

    /// An URL without a host was given where one is required
    #[error("URL is missing a host")]
    InvalidUrlHost,

    /// The configuration file cannot be read
    #[error("Cannot read configuration file `{path}`: {1}", path = .0.display())]
    ReadConfig(PathBuf, #[source] std::io::Error),

    /// The configuration file is not valid TOML or has unexpected keys
    #[error("Cannot parse configuration: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// A custom transport failed with an error of its own
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<(PathBuf, std::io::Error)> for ErrorKind {
    fn from(value: (PathBuf, std::io::Error)) -> Self {
        Self::IoError(Some(value.0), value.1)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(None, e)
    }
}

impl From<(String, url::ParseError)> for ErrorKind {
    fn from(value: (String, url::ParseError)) -> Self {
        Self::ParseUrl(value.0, value.1)
    }
}

impl From<Infallible> for ErrorKind {
    fn from(_: Infallible) -> Self {
        // tautological
        unreachable!()
    }
}
