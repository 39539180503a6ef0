use http::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// How intermediate HTTP caches should treat a fetch request.
///
/// The policy only adds request headers; honouring them is up to the
/// server and any caches in between.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, VariantNames, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Leave caching to the defaults of the server and intermediaries
    #[default]
    Default,
    /// Skip caches and go straight to the origin server
    BypassCache,
    /// Ask for a fresh copy, refreshing caches on the way
    Reload,
    /// Allow cached copies, but only after revalidation with the origin
    Revalidate,
    /// Neither use cached copies nor store the response
    NoCacheNoStore,
}

impl CachePolicy {
    /// The request headers expressing this policy
    #[must_use]
    pub fn headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self {
            Self::Default => {}
            Self::BypassCache | Self::Reload => {
                headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
                headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
            }
            Self::Revalidate => {
                headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
            }
            Self::NoCacheNoStore => {
                headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
                headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
            }
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CachePolicy::Default, None, None)]
    #[case(CachePolicy::BypassCache, Some("no-cache"), Some("no-cache"))]
    #[case(CachePolicy::Reload, Some("no-cache"), Some("no-cache"))]
    #[case(CachePolicy::Revalidate, Some("max-age=0"), None)]
    #[case(CachePolicy::NoCacheNoStore, Some("no-cache, no-store"), Some("no-cache"))]
    fn test_policy_headers(
        #[case] policy: CachePolicy,
        #[case] cache_control: Option<&str>,
        #[case] pragma: Option<&str>,
    ) {
        let headers = policy.headers();
        assert_eq!(
            headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            cache_control
        );
        assert_eq!(headers.get(PRAGMA).and_then(|v| v.to_str().ok()), pragma);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "no-cache-no-store".parse::<CachePolicy>().unwrap(),
            CachePolicy::NoCacheNoStore
        );
        assert_eq!(
            "Bypass-Cache".parse::<CachePolicy>().unwrap(),
            CachePolicy::BypassCache
        );
        assert!("sometimes".parse::<CachePolicy>().is_err());
        assert_eq!(CachePolicy::Revalidate.to_string(), "revalidate");
    }
}
