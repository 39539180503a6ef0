use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use super::BodyReader;
use crate::host::{ConnectionLease, HostKey};

/// A response body that holds one connection slot of its host.
///
/// Reads pass through to the body. Closing drops the body, which lets the
/// transport release the connection, and gives the slot back to the
/// [`crate::host::HostRegistry`]. Dropping an open stream closes it.
pub struct DedicatedStream {
    body: Option<BodyReader>,
    lease: ConnectionLease,
}

impl DedicatedStream {
    pub(crate) fn new(body: BodyReader, lease: ConnectionLease) -> Self {
        Self {
            body: Some(body),
            lease,
        }
    }

    /// The host this stream is connected to
    #[must_use]
    pub const fn host(&self) -> &HostKey {
        self.lease.host()
    }

    /// Whether [`DedicatedStream::close`] was called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.lease.is_released()
    }

    /// Close the stream and hand its connection slot back.
    ///
    /// Only the first call has an effect. Reading from a closed stream
    /// fails.
    pub fn close(&mut self) {
        self.body = None;
        self.lease.release();
    }
}

impl fmt::Debug for DedicatedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedicatedStream")
            .field("host", self.host())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl AsyncRead for DedicatedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut().body.as_mut() {
            Some(body) => Pin::new(body).poll_read(cx, buf),
            None => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "read from a closed stream",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::host::{HostKey, HostRegistry};
    use crate::stream::FetchStream;
    use tokio::io::AsyncReadExt;
    use url::Url;

    fn dedicated(registry: &HostRegistry) -> super::DedicatedStream {
        let url = Url::parse("https://example.com/").unwrap();
        match registry.select(HostKey::from("example.com"), 10, Box::new(&b"data"[..]), url) {
            FetchStream::Dedicated(stream) => stream,
            other => panic!("expected a dedicated stream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_after_close_fails() {
        let registry = HostRegistry::new();
        let mut stream = dedicated(&registry);
        assert!(!stream.is_closed());

        stream.close();
        assert!(stream.is_closed());

        let mut buf = Vec::new();
        let err = stream.read_to_end(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_close_twice_keeps_count() {
        let registry = HostRegistry::new();
        let host = HostKey::from("example.com");
        let mut stream = dedicated(&registry);
        assert_eq!(registry.open_connections(&host), 1);

        stream.close();
        stream.close();
        assert_eq!(registry.open_connections(&host), 0);
        drop(stream);
        assert_eq!(registry.open_connections(&host), 0);
    }

    #[test]
    fn test_drop_releases_slot() {
        let registry = HostRegistry::new();
        let stream = dedicated(&registry);
        assert_eq!(registry.open_connections(stream.host()), 1);

        drop(stream);
        assert_eq!(registry.open_connections(&HostKey::from("example.com")), 0);
    }
}
