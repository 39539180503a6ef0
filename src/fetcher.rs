//! Entry point for fetching resources.
//!
//! This module defines two structs, [`Fetcher`] and [`FetcherBuilder`].
//! `Fetcher` turns requests into byte streams. `FetcherBuilder` exposes a
//! finer level of granularity for building a `Fetcher`.
//!
//! For convenience, a free function [`fetch`] is provided for ad-hoc
//! fetches.
#![allow(clippy::module_name_repetitions)]
use std::{sync::Arc, time::Duration};

use http::HeaderMap;
use log::debug;
use tokio::fs::File;
use typed_builder::TypedBuilder;

use crate::{
    ErrorKind, FetchRequest, Result, Uri,
    config::{
        DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT, FetchConfig,
        HostConfigs,
    },
    host::HostRegistry,
    stream::{FetchStream, PooledStream},
    transport::{HostPooling, ReqwestTransport, Transport, TransportResponse},
};

/// Builder for [`Fetcher`].
///
/// ```
/// use fetchgate::FetcherBuilder;
///
/// # fn main() -> fetchgate::Result<()> {
/// let fetcher = FetcherBuilder::builder()
///     .max_connections(4usize)
///     .build()
///     .fetcher()?;
/// # Ok(())
/// # }
/// ```
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
pub struct FetcherBuilder {
    /// Default number of concurrent connections per host.
    ///
    /// A response is only handed out as a dedicated stream while more than
    /// one of these connections is still free.
    #[builder(default = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,
    /// Per-host overrides of the connection limit and headers.
    hosts: HostConfigs,
    /// User-agent sent with every request.
    #[builder(default = String::from(DEFAULT_USER_AGENT))]
    user_agent: String,
    /// Response timeout per request.
    timeout: Option<Duration>,
    /// Maximum number of redirects per request before returning an error.
    #[builder(default = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,
    /// When `true`, accept invalid SSL certificates.
    ///
    /// ## Warning
    ///
    /// You should think very carefully before using this method. If
    /// invalid certificates are trusted, any certificate for any site
    /// will be trusted for use. This includes expired certificates.
    allow_insecure: bool,
    /// Sets the default headers for every request.
    custom_headers: HeaderMap,
}

impl Default for FetcherBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<FetchConfig> for FetcherBuilder {
    fn from(config: FetchConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            hosts: config.hosts,
            user_agent: config.user_agent,
            timeout: config.timeout,
            max_redirects: config.max_redirects,
            allow_insecure: config.allow_insecure,
            custom_headers: config.headers,
        }
    }
}

impl FetcherBuilder {
    /// Instantiates a [`Fetcher`] backed by a [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    pub fn fetcher(self) -> Result<Fetcher> {
        let config = FetchConfig {
            max_connections: self.max_connections,
            user_agent: self.user_agent,
            timeout: self.timeout,
            max_redirects: self.max_redirects,
            allow_insecure: self.allow_insecure,
            headers: self.custom_headers,
            hosts: self.hosts,
        };
        Fetcher::new(config)
    }
}

/// Turns [`FetchRequest`]s into [`FetchStream`]s.
///
/// Local files are opened directly. Everything else goes through the
/// [`Transport`], and the response body is handed to the [`HostRegistry`]
/// to decide whether it becomes a dedicated or a pooled stream.
///
/// Clones share the same transport and registry, so connection accounting
/// spans all of them.
#[derive(Debug, Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    registry: HostRegistry,
}

impl Fetcher {
    /// Create a fetcher using `reqwest` configured by `config`
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the request client cannot be created
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new(config)?)))
    }

    /// Create a fetcher sending remote requests through `transport`
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registry: HostRegistry::new(),
        }
    }

    /// The registry tracking dedicated streams of this fetcher
    #[must_use]
    pub const fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Fetch a single resource
    ///
    /// # Errors
    ///
    /// This returns an `Err` if
    /// - `request` is invalid.
    /// - a local file cannot be opened.
    /// - the transport fails. Its error is passed on unchanged and the
    ///   request is not retried.
    pub async fn fetch<T, E>(&self, request: T) -> Result<FetchStream>
    where
        FetchRequest: TryFrom<T, Error = E>,
        ErrorKind: From<E>,
    {
        let request = FetchRequest::try_from(request)?;

        if request.uri.is_file() {
            self.fetch_file(&request.uri).await
        } else {
            self.fetch_remote(&request).await
        }
    }

    async fn fetch_file(&self, uri: &Uri) -> Result<FetchStream> {
        let path = uri.to_file_path()?;
        debug!("Opening local file {}", path.display());

        // `tokio::fs` runs the open on the blocking pool
        let file = File::open(&path)
            .await
            .map_err(|e| ErrorKind::from((path, e)))?;
        Ok(FetchStream::File(file))
    }

    async fn fetch_remote(&self, request: &FetchRequest) -> Result<FetchStream> {
        debug!("Fetching {}", request.uri);
        let TransportResponse { url, body, pooling } = self.transport.send(request).await?;

        let stream = match pooling {
            Some(HostPooling {
                host,
                connection_limit,
            }) => self.registry.select(host, connection_limit, body, url),
            None => {
                debug!("No per-host pooling for {url}");
                FetchStream::Pooled(PooledStream::new(url, body))
            }
        };

        // Free the connection of a pooled response for the next request
        match stream {
            FetchStream::Pooled(pooled) => Ok(FetchStream::Pooled(pooled.cache().await?)),
            stream => Ok(stream),
        }
    }
}

/// A convenience function to fetch a single resource.
///
/// This creates a new [`Fetcher`] with default settings for every call, so
/// connection accounting does not carry over between calls. Reuse a
/// [`Fetcher`] for anything but one-off fetches.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The fetcher cannot be built (see [`FetcherBuilder::fetcher`] for failure cases).
/// - The resource cannot be fetched (see [`Fetcher::fetch`] for failure cases).
pub async fn fetch<T, E>(request: T) -> Result<FetchStream>
where
    FetchRequest: TryFrom<T, Error = E>,
    ErrorKind: From<E>,
{
    let fetcher = FetcherBuilder::default().fetcher()?;
    fetcher.fetch(request).await
}
