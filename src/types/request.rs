use typed_builder::TypedBuilder;
use url::Url;

use crate::{BasicAuthCredentials, CachePolicy, ErrorKind, ProxyConfig, Result, Uri};

/// A request to fetch a single resource.
///
/// Only `uri` is required. The optional parts are applied by the transport
/// and ignored for local files.
///
/// ```
/// use fetchgate::{CachePolicy, FetchRequest};
///
/// let request = FetchRequest::builder()
///     .uri(fetchgate::Uri::try_from("https://example.com/catalog.xml").unwrap())
///     .cache_policy(CachePolicy::Revalidate)
///     .build();
/// assert_eq!(request.uri.as_str(), "https://example.com/catalog.xml");
/// ```
#[derive(TypedBuilder, Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// The resource to fetch
    pub uri: Uri,

    /// Credentials sent to the origin server
    #[builder(default, setter(strip_option))]
    pub credentials: Option<BasicAuthCredentials>,

    /// An explicit proxy for this request
    #[builder(default, setter(strip_option))]
    pub proxy: Option<ProxyConfig>,

    /// Cache directives added to the request
    #[builder(default, setter(strip_option))]
    pub cache_policy: Option<CachePolicy>,
}

impl FetchRequest {
    /// Create a plain request for `uri` without any options
    #[must_use]
    pub const fn new(uri: Uri) -> Self {
        Self {
            uri,
            credentials: None,
            proxy: None,
            cache_policy: None,
        }
    }
}

impl From<Uri> for FetchRequest {
    fn from(uri: Uri) -> Self {
        Self::new(uri)
    }
}

impl From<Url> for FetchRequest {
    fn from(url: Url) -> Self {
        Self::new(Uri::from(url))
    }
}

impl TryFrom<&str> for FetchRequest {
    type Error = ErrorKind;

    fn try_from(s: &str) -> Result<Self> {
        Ok(Self::new(Uri::try_from(s)?))
    }
}

impl TryFrom<String> for FetchRequest {
    type Error = ErrorKind;

    fn try_from(s: String) -> Result<Self> {
        Ok(Self::new(Uri::try_from(s)?))
    }
}
