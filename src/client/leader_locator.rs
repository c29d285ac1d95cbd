use crate::client::connection_pool::ConnectionPool;
use crate::client::error::SessionError;
use crate::client::rpc::Rpc;
use crate::messages::LeaderHinted;
use crate::transport::TransportErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio::time::Duration;

/// LeaderLocator holds a session's guess at the active leader and routes leader-directed sends.
///
/// All leader-directed sends from one session are serialized by `send_lock`, which is held for the
/// whole locate-and-send loop. The guess itself is an atomic so readers (the fast path comparing
/// before/after snapshots) never wait on an in-flight send; it is only ever written by `retarget`.
pub(crate) struct LeaderLocator {
    logger: slog::Logger,
    guess: AtomicUsize,
    send_lock: Mutex<()>,
    backoff: Duration,
}

impl LeaderLocator {
    pub fn new(logger: slog::Logger, initial_guess: usize, backoff: Duration) -> Self {
        LeaderLocator {
            logger,
            guess: AtomicUsize::new(initial_guess),
            send_lock: Mutex::new(()),
            backoff,
        }
    }

    pub fn current_guess(&self) -> usize {
        self.guess.load(Ordering::Acquire)
    }

    /// Sends `request` to the guessed leader, following redirects until a member accepts it.
    ///
    /// Each loop iteration counts as one try, and at most one try per cluster member is made:
    /// * unreachable member: move on round-robin.
    /// * rejected with a hint: jump to the hinted member (round-robin if the hint names a member
    ///   we don't know).
    /// * rejected without a hint: an election is probably running, so wait and ask again.
    pub async fn send_to_leader<R>(&self, pool: &ConnectionPool, request: &R) -> Result<R::Response, SessionError>
    where
        R: Rpc,
        R::Response: LeaderHinted,
    {
        let _send_guard = self.send_lock.lock().await;
        let num_members = pool.len();

        for _ in 0..num_members {
            let guess = self.current_guess();
            let response = match pool.call(guess, request).await {
                Ok(response) => response,
                Err(e) if e.kind() == TransportErrorKind::Malformed => {
                    return Err(SessionError::MalformedResponse(e.to_string()));
                }
                Err(e) => {
                    slog::info!(self.logger, "Leader guess {} failed: {}", guess, e);
                    self.retarget((guess + 1) % num_members);
                    continue;
                }
            };

            if response.succeeded() {
                return Ok(response);
            }

            match response.leader_hint() {
                Some(hint) => {
                    let next = pool.index_of(hint).unwrap_or((guess + 1) % num_members);
                    slog::info!(self.logger, "Redirected from {} to {} (hint {})", guess, next, hint);
                    self.retarget(next);
                }
                None => {
                    slog::info!(self.logger, "Member {} knows no leader. Backing off.", guess);
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }

        Err(SessionError::NoActiveLeader)
    }

    fn retarget(&self, next: usize) {
        self.guess.store(next, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_utils::{addresses, test_logger, FakeCluster};
    use crate::messages::{ClientIdRequest, MemberAddress};
    use std::sync::Arc;

    fn setup(n: usize, leader: usize) -> (Vec<MemberAddress>, FakeCluster, ConnectionPool) {
        let members = addresses(n);
        let cluster = FakeCluster::with_leader(&members, leader);
        let pool = ConnectionPool::new(test_logger(), Arc::new(cluster.clone()), members.clone());
        (members, cluster, pool)
    }

    fn locator(initial_guess: usize) -> LeaderLocator {
        LeaderLocator::new(test_logger(), initial_guess, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn follows_leader_hint() {
        let (members, cluster, pool) = setup(3, 2);
        let locator = locator(0);

        let response = locator.send_to_leader(&pool, &ClientIdRequest::new()).await.unwrap();

        assert_eq!(response.client_id.as_u64(), 42);
        assert_eq!(locator.current_guess(), 2);
        // One redirect hop, straight to the leader.
        assert_eq!(cluster.calls(&members[0]).client_id, 1);
        assert_eq!(cluster.calls(&members[1]).client_id, 0);
        assert_eq!(cluster.calls(&members[2]).client_id, 1);
    }

    #[tokio::test]
    async fn skips_unreachable_member() {
        let (members, cluster, pool) = setup(3, 1);
        cluster.update(&members[0], |m| m.reachable = false);
        let locator = locator(0);

        locator.send_to_leader(&pool, &ClientIdRequest::new()).await.unwrap();

        assert_eq!(locator.current_guess(), 1);
    }

    #[tokio::test]
    async fn unknown_hint_falls_back_to_round_robin() {
        let (members, cluster, pool) = setup(3, 1);
        cluster.update(&members[0], |m| m.leader_hint = Some(MemberAddress::new("elsewhere:1")));
        let locator = locator(0);

        locator.send_to_leader(&pool, &ClientIdRequest::new()).await.unwrap();

        assert_eq!(locator.current_guess(), 1);
    }

    #[tokio::test]
    async fn no_leader_anywhere() {
        let (members, cluster, pool) = setup(3, 0);
        cluster.update_all(|m| {
            m.is_leader = false;
            m.leader_hint = None;
        });
        let locator = locator(0);

        let result = locator.send_to_leader(&pool, &ClientIdRequest::new()).await;

        assert!(matches!(result, Err(SessionError::NoActiveLeader)));
        // Without hints the guess doesn't move; the same member is polled once per try.
        assert_eq!(cluster.calls(&members[0]).client_id, 3);
    }

    #[tokio::test]
    async fn every_member_down() {
        let (_, cluster, pool) = setup(3, 0);
        cluster.update_all(|m| m.reachable = false);
        let locator = locator(0);

        let result = locator.send_to_leader(&pool, &ClientIdRequest::new()).await;

        assert!(matches!(result, Err(SessionError::NoActiveLeader)));
    }

    #[tokio::test]
    async fn malformed_response_is_not_retried() {
        let (members, cluster, pool) = setup(3, 1);
        cluster.update(&members[0], |m| m.malformed = true);
        let locator = locator(0);

        let result = locator.send_to_leader(&pool, &ClientIdRequest::new()).await;

        assert!(matches!(result, Err(SessionError::MalformedResponse(_))));
        assert_eq!(cluster.calls(&members[1]).client_id, 0);
    }

    #[tokio::test]
    async fn converges_within_cluster_size_hops_from_any_guess() {
        for leader in 0..5 {
            for initial_guess in 0..5 {
                let (_, _, pool) = setup(5, leader);
                let locator = locator(initial_guess);

                locator.send_to_leader(&pool, &ClientIdRequest::new()).await.unwrap();

                assert_eq!(locator.current_guess(), leader);
            }
        }
    }
}
