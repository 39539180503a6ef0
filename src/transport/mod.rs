//! The HTTP client a [`crate::Fetcher`] sends remote requests through.
//!
//! [`ReqwestTransport`] is the default. Other implementations of
//! [`Transport`] can be plugged in with [`crate::Fetcher::with_transport`].

mod client;

use std::fmt::Debug;

use async_trait::async_trait;
use url::Url;

pub use client::ReqwestTransport;

use crate::host::HostKey;
use crate::stream::BodyReader;
use crate::{FetchRequest, Result};

/// Connection pooling information a transport reports for a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPooling {
    /// The host the response came from
    pub host: HostKey,
    /// How many connections the transport allows to this host at once
    pub connection_limit: usize,
}

/// A response as received from a [`Transport`]
pub struct TransportResponse {
    /// The URL the response was served from, after redirects
    pub url: Url,
    /// The response body
    pub body: BodyReader,
    /// `None` if the transport does not pool connections per host
    /// for this response
    pub pooling: Option<HostPooling>,
}

impl Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("url", &self.url.as_str())
            .field("pooling", &self.pooling)
            .finish_non_exhaustive()
    }
}

/// Sends a remote [`FetchRequest`] and returns the response once its
/// head has arrived. The body is streamed afterwards.
///
/// Errors are returned to the caller of [`crate::Fetcher::fetch`]
/// unchanged; transports should not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send `request` and wait for the response
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse>;
}
