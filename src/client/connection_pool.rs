use crate::client::rpc::Rpc;
use crate::messages::MemberAddress;
use crate::transport::{Connection, Connector, TransportError, TransportErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// ConnectionPool keeps one lazily-opened connection per cluster member. Each slot has its own
/// lock, held for a whole request/response exchange, so sends to different members never wait on
/// each other and sends to the same member never interleave.
pub(crate) struct ConnectionPool {
    logger: slog::Logger,
    connector: Arc<dyn Connector>,
    slots: Vec<ConnectionSlot>,
    closed: AtomicBool,
}

struct ConnectionSlot {
    address: MemberAddress,
    connection: Mutex<Option<Box<dyn Connection>>>,
}

impl ConnectionPool {
    pub fn new(logger: slog::Logger, connector: Arc<dyn Connector>, members: Vec<MemberAddress>) -> Self {
        let slots = members
            .into_iter()
            .map(|address| ConnectionSlot {
                address,
                connection: Mutex::new(None),
            })
            .collect();

        ConnectionPool {
            logger,
            connector,
            slots,
            closed: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn index_of(&self, address: &MemberAddress) -> Option<usize> {
        self.slots.iter().position(|slot| &slot.address == address)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Opens a connection to every member and returns the indexes of the ones that answered.
    pub async fn connect_all(&self) -> Vec<usize> {
        let mut reachable = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let mut connection = slot.connection.lock().await;
            if connection.is_some() {
                reachable.push(index);
                continue;
            }

            match self.connector.connect(&slot.address).await {
                Ok(c) => {
                    *connection = Some(c);
                    reachable.push(index);
                }
                Err(e) => slog::warn!(self.logger, "Member {} unreachable: {}", slot.address, e),
            }
        }

        reachable
    }

    /// Performs one exchange with member `index`, opening its connection first if needed. A failed
    /// exchange drops the connection so the next call re-establishes it.
    pub async fn call<R: Rpc>(&self, index: usize, request: &R) -> Result<R::Response, TransportError> {
        if self.is_closed() {
            return Err(TransportError::connect("Connection pool is closed"));
        }
        let slot = match self.slots.get(index) {
            Some(slot) => slot,
            None => return Err(TransportError::connect(format!("No cluster member at index {}", index))),
        };

        let mut guard = slot.connection.lock().await;
        if guard.is_none() {
            slog::debug!(self.logger, "Opening connection to {}", slot.address);
            *guard = Some(self.connector.connect(&slot.address).await?);
        }
        let connection = match guard.as_mut() {
            Some(c) => c,
            None => return Err(TransportError::connect(format!("Lost connection to {}", slot.address))),
        };

        let result = request.call(&mut **connection).await;
        if let Err(e) = &result {
            if e.kind() != TransportErrorKind::Malformed {
                slog::debug!(self.logger, "Dropping connection to {} after: {}", slot.address, e);
                *guard = None;
            }
        }

        result
    }

    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        for slot in &self.slots {
            *slot.connection.lock().await = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_utils::{addresses, test_logger, FakeCluster};
    use crate::messages::ClientIdRequest;

    fn pool(cluster: &FakeCluster, members: &[MemberAddress]) -> ConnectionPool {
        ConnectionPool::new(test_logger(), Arc::new(cluster.clone()), members.to_vec())
    }

    #[tokio::test]
    async fn connection_is_opened_once_and_reused() {
        let members = addresses(3);
        let cluster = FakeCluster::with_leader(&members, 0);
        let pool = pool(&cluster, &members);

        pool.call(1, &ClientIdRequest::new()).await.unwrap();
        pool.call(1, &ClientIdRequest::new()).await.unwrap();

        assert_eq!(cluster.calls(&members[1]).connects, 1);
        assert_eq!(cluster.calls(&members[1]).client_id, 2);
        assert_eq!(cluster.calls(&members[0]).connects, 0);
    }

    #[tokio::test]
    async fn failed_exchange_reconnects_next_time() {
        let members = addresses(2);
        let cluster = FakeCluster::with_leader(&members, 0);
        let pool = pool(&cluster, &members);

        pool.call(0, &ClientIdRequest::new()).await.unwrap();
        cluster.update(&members[0], |m| m.reachable = false);
        assert!(pool.call(0, &ClientIdRequest::new()).await.is_err());
        cluster.update(&members[0], |m| m.reachable = true);
        pool.call(0, &ClientIdRequest::new()).await.unwrap();

        assert_eq!(cluster.calls(&members[0]).connects, 2);
    }

    #[tokio::test]
    async fn connect_all_reports_reachable_members() {
        let members = addresses(3);
        let cluster = FakeCluster::with_leader(&members, 0);
        cluster.update(&members[0], |m| m.reachable = false);
        let pool = pool(&cluster, &members);

        assert_eq!(pool.connect_all().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn closed_pool_refuses_calls() {
        let members = addresses(1);
        let cluster = FakeCluster::with_leader(&members, 0);
        let pool = pool(&cluster, &members);
        pool.connect_all().await;

        pool.close().await;

        assert!(pool.is_closed());
        assert!(pool.call(0, &ClientIdRequest::new()).await.is_err());
        assert_eq!(cluster.calls(&members[0]).client_id, 0);
    }
}
