use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace};
use url::Url;

use super::key::HostKey;
use crate::stream::{BodyReader, DedicatedStream, FetchStream, PooledStream};

/// Bookkeeping for a single host in the [`HostRegistry`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostEntry {
    /// Number of dedicated streams currently open to this host
    open: usize,
}

impl HostEntry {
    /// Number of dedicated streams currently open to this host
    #[must_use]
    pub const fn open(&self) -> usize {
        self.open
    }
}

/// Whether one more dedicated stream fits below `connection_limit`.
///
/// One slot below the limit always stays free for the transport's own
/// connection reuse, so a limit of 0 or 1 never admits a dedicated stream.
#[must_use]
pub const fn admits_dedicated(open: usize, connection_limit: usize) -> bool {
    open.saturating_add(1) < connection_limit
}

/// Tracks how many dedicated streams are open per host and decides which
/// kind of stream a response body is handed out as.
///
/// All clones share the same underlying map. A single lock guards the map
/// for every host, so a read-decide-update sequence for one host can never
/// interleave with another one. Entries are created on the first dedicated
/// stream for a host and are never removed; an idle host keeps an entry
/// with a count of zero.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    hosts: Arc<Mutex<HashMap<HostKey, HostEntry>>>,
}

impl HostRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The map is consistent after every critical section, so a panic in
    // another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, HashMap<HostKey, HostEntry>> {
        self.hosts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wrap a response body for `host`, respecting its `connection_limit`.
    ///
    /// If one more dedicated stream still leaves a connection slot free,
    /// the host's count is incremented and a [`DedicatedStream`] is returned;
    /// closing (or dropping) it gives the slot back. Otherwise the body is
    /// returned as a [`PooledStream`] carrying `response_url`, and the
    /// registry is left untouched.
    ///
    /// The lookup, the decision and the increment happen under one lock
    /// acquisition.
    #[must_use]
    pub fn select(
        &self,
        host: HostKey,
        connection_limit: usize,
        body: BodyReader,
        response_url: Url,
    ) -> FetchStream {
        let mut hosts = self.lock();
        let open = hosts.get(&host).map_or(0, HostEntry::open);

        if admits_dedicated(open, connection_limit) {
            hosts.entry(host.clone()).or_default().open += 1;
            debug!(
                "Host {host} gets a dedicated stream ({} of {connection_limit} connections)",
                open + 1
            );
            let lease = ConnectionLease {
                registry: self.clone(),
                host,
                released: false,
            };
            FetchStream::Dedicated(DedicatedStream::new(body, lease))
        } else {
            debug!(
                "Host {host} is near its connection limit ({open} of {connection_limit} open), \
                 returning a pooled stream"
            );
            FetchStream::Pooled(PooledStream::new(response_url, body))
        }
    }

    /// Hand back one connection slot of `host`
    fn release(&self, host: &HostKey) {
        let mut hosts = self.lock();
        let remaining = hosts.get_mut(host).and_then(|entry| {
            entry.open = entry.open.checked_sub(1)?;
            Some(entry.open)
        });

        match remaining {
            Some(open) => trace!("Host {host} released a dedicated stream, {open} still open"),
            None => {
                error!("Released a dedicated stream for host {host} that has none open");
                debug_assert!(false, "connection count underflow for host {host}");
            }
        }
    }

    /// Number of dedicated streams currently open to `host`
    #[must_use]
    pub fn open_connections(&self, host: &HostKey) -> usize {
        self.lock().get(host).map_or(0, HostEntry::open)
    }

    /// Get the entry for `host`, if a dedicated stream was ever issued for it
    #[must_use]
    pub fn entry(&self, host: &HostKey) -> Option<HostEntry> {
        self.lock().get(host).copied()
    }

    /// Copy of the open dedicated stream count of every known host,
    /// including hosts that are currently idle
    #[must_use]
    pub fn snapshot(&self) -> HashMap<HostKey, usize> {
        self.lock()
            .iter()
            .map(|(host, entry)| (host.clone(), entry.open))
            .collect()
    }

    /// Number of hosts that ever received a dedicated stream
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.lock().len()
    }
}

/// The right to one dedicated connection slot of a host.
///
/// Releasing gives the slot back to the [`HostRegistry`] it came from.
/// Releasing is idempotent, and a lease that was never released explicitly
/// is released when dropped.
#[derive(Debug)]
pub struct ConnectionLease {
    registry: HostRegistry,
    host: HostKey,
    released: bool,
}

impl ConnectionLease {
    /// The host this slot belongs to
    #[must_use]
    pub const fn host(&self) -> &HostKey {
        &self.host
    }

    /// Whether the slot was already handed back
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// Hand the slot back. Later calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.registry.release(&self.host);
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn body() -> BodyReader {
        Box::new(tokio::io::empty())
    }

    fn url() -> Url {
        Url::parse("https://example.com/catalog.xml").unwrap()
    }

    fn select(registry: &HostRegistry, host: &str, limit: usize) -> FetchStream {
        registry.select(HostKey::from(host), limit, body(), url())
    }

    #[rstest]
    #[case(5, 0, true)]
    #[case(5, 1, true)]
    #[case(5, 2, true)]
    #[case(5, 3, true)]
    #[case(5, 4, false)]
    #[case(5, 7, false)]
    #[case(2, 0, true)]
    #[case(2, 1, false)]
    #[case(1, 0, false)]
    #[case(0, 0, false)]
    #[case(usize::MAX, usize::MAX, false)]
    fn test_admits_dedicated(#[case] limit: usize, #[case] open: usize, #[case] expected: bool) {
        assert_eq!(admits_dedicated(open, limit), expected);
    }

    #[test]
    fn test_empty_registry() {
        let registry = HostRegistry::new();
        assert_eq!(registry.host_count(), 0);
        assert_eq!(registry.open_connections(&HostKey::from("example.com")), 0);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_select_dedicated_until_reserve() {
        let registry = HostRegistry::new();
        let host = HostKey::from("example.com");

        let streams: Vec<_> = (0..4).map(|_| select(&registry, "example.com", 5)).collect();
        assert!(streams.iter().all(FetchStream::is_dedicated));
        assert_eq!(registry.open_connections(&host), 4);

        // The last slot is kept for the transport
        let pooled = select(&registry, "example.com", 5);
        assert!(pooled.is_pooled());
        assert_eq!(registry.open_connections(&host), 4);

        drop(streams);
        assert_eq!(registry.open_connections(&host), 0);
    }

    #[test]
    fn test_select_limit_one_is_always_pooled() {
        let registry = HostRegistry::new();
        let stream = select(&registry, "example.com", 1);
        assert!(stream.is_pooled());
        assert_eq!(registry.host_count(), 0);
    }

    #[test]
    fn test_select_limit_zero_is_always_pooled() {
        let registry = HostRegistry::new();
        assert!(select(&registry, "example.com", 0).is_pooled());
        assert_eq!(registry.entry(&HostKey::from("example.com")), None);
    }

    #[test]
    fn test_pooled_does_not_create_entry() {
        let registry = HostRegistry::new();
        let FetchStream::Pooled(pooled) = select(&registry, "example.com", 1) else {
            panic!("expected a pooled stream");
        };
        assert_eq!(pooled.url(), &url());
        assert_eq!(registry.host_count(), 0);
    }

    #[test]
    fn test_hosts_are_counted_separately() {
        let registry = HostRegistry::new();
        let a = select(&registry, "a.example.com", 2);
        let b1 = select(&registry, "b.example.com", 2);
        let b2 = select(&registry, "b.example.com", 2);
        let b3 = select(&registry, "b.example.com", 3);

        assert!(a.is_dedicated());
        assert!(b1.is_dedicated());
        assert!(b2.is_pooled());
        assert!(b3.is_dedicated());
        assert_eq!(registry.open_connections(&HostKey::from("a.example.com")), 1);
        assert_eq!(registry.open_connections(&HostKey::from("b.example.com")), 2);
        assert_eq!(registry.host_count(), 2);
    }

    #[test]
    fn test_idle_entries_are_kept() {
        let registry = HostRegistry::new();
        let stream = select(&registry, "example.com", 10);
        drop(stream);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&HostKey::from("example.com")), Some(&0));

        // A stale entry is reused, not duplicated
        let _stream = select(&registry, "example.com", 10);
        assert_eq!(registry.host_count(), 1);
        assert_eq!(registry.open_connections(&HostKey::from("example.com")), 1);
    }

    #[test]
    fn test_count_tracks_issued_minus_closed() {
        let registry = HostRegistry::new();
        let host = HostKey::from("example.com");
        let mut open = Vec::new();

        for round in 0..20 {
            if round % 3 == 2 {
                let mut stream: FetchStream = open.remove(0);
                stream.close();
            } else {
                open.push(select(&registry, "example.com", 100));
            }
            assert_eq!(registry.open_connections(&host), open.len());
        }
    }

    #[test]
    fn test_lease_release_is_idempotent() {
        let registry = HostRegistry::new();
        let host = HostKey::from("example.com");
        let _other = select(&registry, "example.com", 10);

        let FetchStream::Dedicated(mut stream) = select(&registry, "example.com", 10) else {
            panic!("expected a dedicated stream");
        };
        assert_eq!(registry.open_connections(&host), 2);

        stream.close();
        stream.close();
        assert_eq!(registry.open_connections(&host), 1);

        drop(stream);
        assert_eq!(registry.open_connections(&host), 1);
    }

    #[test]
    fn test_release_order_is_free() {
        let registry = HostRegistry::new();
        let host = HostKey::from("example.com");
        let first = select(&registry, "example.com", 10);
        let second = select(&registry, "example.com", 10);

        drop(second);
        assert_eq!(registry.open_connections(&host), 1);
        drop(first);
        assert_eq!(registry.open_connections(&host), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_selection_loses_no_updates() {
        const TASKS: usize = 64;
        let registry = HostRegistry::new();

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { select(&registry, "example.com", TASKS + 1) })
            })
            .collect();

        let mut streams = Vec::with_capacity(TASKS);
        for handle in handles {
            streams.push(handle.await.unwrap());
        }

        assert!(streams.iter().all(FetchStream::is_dedicated));
        assert_eq!(
            registry.open_connections(&HostKey::from("example.com")),
            TASKS
        );

        let closers: Vec<_> = streams
            .into_iter()
            .map(|mut stream| tokio::spawn(async move { stream.close() }))
            .collect();
        for closer in closers {
            closer.await.unwrap();
        }
        assert_eq!(registry.open_connections(&HostKey::from("example.com")), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_selection_respects_limit() {
        let registry = HostRegistry::new();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { select(&registry, "example.com", 5) })
            })
            .collect();

        let mut dedicated = 0;
        let mut streams = Vec::new();
        for handle in handles {
            let stream = handle.await.unwrap();
            if stream.is_dedicated() {
                dedicated += 1;
            }
            streams.push(stream);
        }

        assert_eq!(dedicated, 4);
        assert_eq!(registry.open_connections(&HostKey::from("example.com")), 4);
    }
}
