#![allow(unreachable_pub)]

mod cache_policy;
mod credentials;
mod error;
mod proxy;
mod request;
mod uri;

pub use cache_policy::CachePolicy;
pub use credentials::{BasicAuthCredentials, BasicAuthCredentialsParseError};
pub use error::ErrorKind;
pub use proxy::ProxyConfig;
pub use request::FetchRequest;
pub use uri::Uri;

/// The fetchgate `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
