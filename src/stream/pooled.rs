use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use url::Url;

use super::BodyReader;
use crate::{ErrorKind, Result};

/// A response body tagged with the URL it was resolved to.
///
/// The URL is the final one after redirects, as reported by the transport,
/// so a caching layer can key on it. Pooled streams are not counted against
/// their host's connection budget. A [`crate::Fetcher`] reads their body
/// into memory before handing them out, so the connection goes back to the
/// transport right away.
pub struct PooledStream {
    url: Url,
    body: BodyReader,
}

impl PooledStream {
    pub(crate) fn new(url: Url, body: BodyReader) -> Self {
        Self { url, body }
    }

    /// Read the whole body into memory and drop the original reader
    pub(crate) async fn cache(self) -> Result<Self> {
        let Self { url, mut body } = self;
        let mut content = Vec::new();
        body.read_to_end(&mut content)
            .await
            .map_err(ErrorKind::ReadResponseBody)?;
        trace!("Cached {} bytes from {url}", content.len());

        Ok(Self {
            url,
            body: Box::new(io::Cursor::new(content)),
        })
    }

    /// The resolved response URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Split into the resolved URL and the body
    #[must_use]
    pub fn into_parts(self) -> (Url, BodyReader) {
        (self.url, self.body)
    }
}

impl fmt::Debug for PooledStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledStream")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl AsyncRead for PooledStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().body).poll_read(cx, buf)
    }
}
