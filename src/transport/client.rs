use async_trait::async_trait;
use dashmap::DashMap;
use futures::TryStreamExt;
use http::header::{self, AUTHORIZATION, HeaderValue};
use log::debug;
use reqwest::Response;
use tokio_util::io::StreamReader;

use super::{HostPooling, Transport, TransportResponse};
use crate::config::FetchConfig;
use crate::host::HostKey;
use crate::{ErrorKind, FetchRequest, ProxyConfig, Result};

/// A [`Transport`] backed by `reqwest`.
///
/// Requests without an explicit proxy share one client. Each distinct
/// [`ProxyConfig`] gets its own client, created on first use and reused
/// afterwards, since `reqwest` configures proxies per client.
///
/// The connection limit reported for a host is the `max_connections`
/// of its [`crate::config::HostConfig`], or the global default. Only the
/// global default reaches `reqwest`, as the number of idle connections kept
/// per host; host overrides are enforced by the
/// [`crate::host::HostRegistry`] alone.
#[derive(Debug)]
pub struct ReqwestTransport {
    config: FetchConfig,
    client: reqwest::Client,
    proxied: DashMap<ProxyConfig, reqwest::Client>,
}

impl ReqwestTransport {
    /// Create a transport from `config`
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user agent is not a valid header value.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = build_client(&config, None)?;
        Ok(Self {
            config,
            client,
            proxied: DashMap::new(),
        })
    }

    /// Number of concurrent connections allowed to `host`
    #[must_use]
    pub fn connection_limit(&self, host: &HostKey) -> usize {
        self.config
            .host(host)
            .effective_max_connections(self.config.max_connections)
    }

    /// Number of clients created for explicit proxies so far
    #[must_use]
    pub fn proxied_client_count(&self) -> usize {
        self.proxied.len()
    }

    /// Get the client for `proxy`, creating it if this is its first use
    fn client_for(&self, proxy: Option<&ProxyConfig>) -> Result<reqwest::Client> {
        let Some(proxy) = proxy else {
            return Ok(self.client.clone());
        };

        if let Some(client) = self.proxied.get(proxy) {
            return Ok(client.clone());
        }

        debug!("Creating request client for proxy {}", proxy.url);
        let client = build_client(&self.config, Some(proxy))?;

        // Another task may have created one in the meantime; keep the first
        Ok(self
            .proxied
            .entry(proxy.clone())
            .or_insert(client)
            .value()
            .clone())
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        request: &FetchRequest,
    ) -> Result<reqwest::Request> {
        let mut builder = client.get(request.uri.as_str());

        if let Ok(host) = HostKey::try_from(&request.uri)
            && let Some(host_config) = self.config.hosts.get(&host)
        {
            builder = builder.headers(host_config.headers.clone());
        }

        if let Some(credentials) = &request.credentials {
            builder = builder.header(AUTHORIZATION, credentials.to_header_value());
        }

        if let Some(policy) = request.cache_policy {
            builder = builder.headers(policy.headers());
        }

        builder.build().map_err(ErrorKind::NetworkRequest)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse> {
        let client = self.client_for(request.proxy.as_ref())?;
        let outbound = self.build_request(&client, request)?;

        let response = client
            .execute(outbound)
            .await
            .and_then(Response::error_for_status)
            .map_err(ErrorKind::NetworkRequest)?;

        let url = response.url().clone();
        let pooling = HostKey::try_from(&url).ok().map(|host| HostPooling {
            connection_limit: self.connection_limit(&host),
            host,
        });

        let body = StreamReader::new(Box::pin(
            response.bytes_stream().map_err(std::io::Error::other),
        ));

        Ok(TransportResponse {
            url,
            body: Box::new(body),
            pooling,
        })
    }
}

fn build_client(config: &FetchConfig, proxy: Option<&ProxyConfig>) -> Result<reqwest::Client> {
    let mut headers = config.headers.clone();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(ErrorKind::InvalidHeader)?,
    );

    let builder = reqwest::ClientBuilder::new()
        .gzip(true)
        .default_headers(headers)
        .danger_accept_invalid_certs(config.allow_insecure)
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .pool_max_idle_per_host(config.max_connections);

    let builder = match config.timeout {
        Some(t) => builder.timeout(t),
        None => builder,
    };

    let builder = match proxy {
        Some(proxy) => builder.proxy(proxy.to_reqwest()?),
        None => builder,
    };

    builder.build().map_err(ErrorKind::BuildRequestClient)
}
