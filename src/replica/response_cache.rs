use crate::messages::{ClientId, SeqNo};
use crate::replica::time::{Clock, RealClock};
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq)]
pub struct CachedResponse {
    pub response: Bytes,
    pub created_at: Instant,
}

/// ResponseCache remembers the response of every applied command by `(client ID, seq no)`, so a
/// retransmitted command gets the original answer instead of being applied twice.
///
/// Entries are bucketed per client. The outer map is sharded, so eviction only ever locks one
/// client's bucket at a time and never blocks the apply path for a whole sweep.
pub struct ResponseCache<C: Clock = RealClock> {
    clients: DashMap<ClientId, HashMap<SeqNo, CachedResponse>>,
    retention: Duration,
    clock: C,
}

impl ResponseCache {
    pub fn new(retention: Duration) -> Self {
        Self::with_clock(retention, RealClock)
    }
}

impl<C: Clock> ResponseCache<C> {
    pub(crate) fn with_clock(retention: Duration, clock: C) -> Self {
        ResponseCache {
            clients: DashMap::new(),
            retention,
            clock,
        }
    }

    pub fn lookup(&self, client_id: ClientId, seq_no: SeqNo) -> Option<CachedResponse> {
        self.clients
            .get(&client_id)
            .and_then(|bucket| bucket.get(&seq_no).cloned())
    }

    /// Stores `response` unless the pair already has one, and returns whichever is cached. The
    /// first response recorded for a pair is the one every retransmission sees.
    pub fn record(&self, client_id: ClientId, seq_no: SeqNo, response: Bytes) -> CachedResponse {
        let created_at = self.clock.now();
        let mut bucket = self.clients.entry(client_id).or_insert_with(HashMap::new);
        bucket
            .entry(seq_no)
            .or_insert_with(|| CachedResponse { response, created_at })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.clients.iter().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry at least `retention` old, and any client bucket left empty. Returns the
    /// number of entries dropped.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let client_ids: Vec<ClientId> = self.clients.iter().map(|bucket| *bucket.key()).collect();

        let mut evicted = 0;
        for client_id in client_ids {
            if let Some(mut bucket) = self.clients.get_mut(&client_id) {
                let before = bucket.len();
                bucket.retain(|_, cached| now.saturating_duration_since(cached.created_at) < self.retention);
                evicted += before - bucket.len();
            }
            // A concurrent `record` may have refilled the bucket in between; only drop it empty.
            self.clients.remove_if(&client_id, |_, bucket| bucket.is_empty());
        }

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replica::time::mocked_clock;
    use std::sync::Arc;

    fn bytes(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn first_record_wins() {
        let cache = ResponseCache::new(Duration::from_secs(30));
        let (c, s) = (ClientId::new(1), SeqNo::new(5));

        assert_eq!(cache.lookup(c, s), None);
        assert_eq!(cache.record(c, s, bytes("first")).response, bytes("first"));
        assert_eq!(cache.record(c, s, bytes("second")).response, bytes("first"));
        assert_eq!(cache.lookup(c, s).unwrap().response, bytes("first"));
    }

    #[test]
    fn same_seq_no_from_different_clients_is_distinct() {
        let cache = ResponseCache::new(Duration::from_secs(30));

        cache.record(ClientId::new(1), SeqNo::new(123), bytes("a"));
        cache.record(ClientId::new(2), SeqNo::new(123), bytes("b"));

        assert_eq!(cache.lookup(ClientId::new(1), SeqNo::new(123)).unwrap().response, bytes("a"));
        assert_eq!(cache.lookup(ClientId::new(2), SeqNo::new(123)).unwrap().response, bytes("b"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn entries_live_exactly_for_the_retention() {
        let (clock, mut controller) = mocked_clock();
        let retention = Duration::from_secs(10);
        let cache = ResponseCache::with_clock(retention, clock);
        let c = ClientId::new(1);

        cache.record(c, SeqNo::new(1), bytes("old"));
        controller.advance(Duration::from_secs(4));
        cache.record(c, SeqNo::new(2), bytes("new"));

        controller.advance(Duration::from_secs(5));
        assert_eq!(cache.evict_expired(), 0);
        assert_eq!(cache.len(), 2);

        // Age of "old" is now exactly the retention.
        controller.advance(Duration::from_secs(1));
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.lookup(c, SeqNo::new(1)), None);
        assert!(cache.lookup(c, SeqNo::new(2)).is_some());

        controller.advance(Duration::from_secs(4));
        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.is_empty());
        assert!(cache.clients.is_empty());
    }

    #[test]
    fn evicting_an_empty_cache_is_a_noop() {
        let cache = ResponseCache::new(Duration::from_secs(1));
        assert_eq!(cache.evict_expired(), 0);
        assert_eq!(cache.evict_expired(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn lookups_stay_consistent_during_eviction() {
        let (clock, mut controller) = mocked_clock();
        let cache = Arc::new(ResponseCache::with_clock(Duration::from_secs(5), clock));

        // Old entries for client 1, which the sweeps will remove.
        for seq in 0..500 {
            cache.record(ClientId::new(1), SeqNo::new(seq), bytes("old"));
        }
        controller.advance(Duration::from_secs(10));

        let sweeper = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    cache.evict_expired();
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut writers = Vec::new();
        for client in 2..6 {
            let cache = cache.clone();
            writers.push(tokio::spawn(async move {
                for seq in 0..500 {
                    let (c, s) = (ClientId::new(client), SeqNo::new(seq));
                    let response = Bytes::from(format!("{}-{}", client, seq));
                    cache.record(c, s, response.clone());
                    // Fresh entries must survive every sweep, intact.
                    assert_eq!(cache.lookup(c, s).unwrap().response, response);
                    tokio::task::yield_now().await;
                }
            }));
        }

        for writer in writers {
            writer.await.unwrap();
        }
        sweeper.await.unwrap();
        cache.evict_expired();

        assert_eq!(cache.lookup(ClientId::new(1), SeqNo::new(0)), None);
        assert_eq!(cache.len(), 4 * 500);
    }
}
