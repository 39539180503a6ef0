//! Byte streams handed out by a [`crate::Fetcher`].
//!
//! Every successful fetch returns exactly one [`FetchStream`]:
//!
//! - [`FetchStream::File`] for `file` URIs, read straight from disk
//! - [`FetchStream::Dedicated`] for responses that keep their connection to
//!   themselves and are accounted for in the [`crate::host::HostRegistry`]
//! - [`FetchStream::Pooled`] for responses that carry their resolved URL so a
//!   caching layer can key on it, leaving connection reuse to the transport

mod dedicated;
mod pooled;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use url::Url;

pub use dedicated::DedicatedStream;
pub use pooled::PooledStream;

use crate::host::HostKey;

/// A raw response body as produced by a [`crate::transport::Transport`]
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// A readable byte stream for a fetched resource
#[derive(Debug)]
pub enum FetchStream {
    /// A local file opened for reading
    File(File),
    /// A response body holding one of its host's connection slots
    Dedicated(DedicatedStream),
    /// A response body tagged with its resolved URL
    Pooled(PooledStream),
}

impl FetchStream {
    /// Returns `true` for a local file
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Returns `true` for a stream accounted for in the host registry
    #[must_use]
    pub const fn is_dedicated(&self) -> bool {
        matches!(self, Self::Dedicated(_))
    }

    /// Returns `true` for a stream carrying its resolved URL
    #[must_use]
    pub const fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }

    /// The host whose connection slot a dedicated stream holds
    #[must_use]
    pub const fn host(&self) -> Option<&HostKey> {
        match self {
            Self::Dedicated(stream) => Some(stream.host()),
            _ => None,
        }
    }

    /// The resolved response URL of a pooled stream
    #[must_use]
    pub const fn response_url(&self) -> Option<&Url> {
        match self {
            Self::Pooled(stream) => Some(stream.url()),
            _ => None,
        }
    }

    /// Close the stream.
    ///
    /// For a dedicated stream this hands its connection slot back right away
    /// instead of waiting for the stream to be dropped. Closing more than once
    /// has no further effect. Other streams are closed when dropped.
    pub fn close(&mut self) {
        if let Self::Dedicated(stream) = self {
            stream.close();
        }
    }
}

impl AsyncRead for FetchStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::File(file) => Pin::new(file).poll_read(cx, buf),
            Self::Dedicated(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Pooled(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostRegistry;
    use tokio::io::AsyncReadExt;

    fn body(content: &'static [u8]) -> BodyReader {
        Box::new(content)
    }

    fn url() -> Url {
        Url::parse("https://example.com/a.xml").unwrap()
    }

    #[tokio::test]
    async fn test_read_dedicated() {
        let registry = HostRegistry::new();
        let mut stream = registry.select(HostKey::from("example.com"), 10, body(b"<a/>"), url());
        assert_eq!(stream.host(), Some(&HostKey::from("example.com")));
        assert_eq!(stream.response_url(), None);

        let mut content = String::new();
        stream.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "<a/>");
    }

    #[tokio::test]
    async fn test_read_pooled() {
        let registry = HostRegistry::new();
        let mut stream = registry.select(HostKey::from("example.com"), 1, body(b"<b/>"), url());
        assert_eq!(stream.host(), None);
        assert_eq!(stream.response_url(), Some(&url()));

        let mut content = String::new();
        stream.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "<b/>");

        // no-op
        stream.close();
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.xml");
        std::fs::write(&path, "<c/>").unwrap();

        let mut stream = FetchStream::File(File::open(&path).await.unwrap());
        assert!(stream.is_file());
        assert_eq!(stream.host(), None);
        assert_eq!(stream.response_url(), None);

        let mut content = String::new();
        stream.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "<c/>");
    }
}
