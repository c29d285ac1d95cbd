use crate::messages::{MemberAddress, RequestId, WitnessGcRequest};
use crate::transport::{Connection, Connector};
use std::sync::Arc;
use tokio::sync::mpsc;

struct Peer {
    address: MemberAddress,
    connection: Option<Box<dyn Connection>>,
}

/// WitnessGcForwarder tells the other members' witnesses which commands the leader has synced.
/// It runs until the event loop drops the sending side.
///
/// Delivery is best effort. A witness that misses a batch keeps those entries until a recovery
/// drains it.
pub(crate) struct WitnessGcForwarder {
    logger: slog::Logger,
    peers: Vec<Peer>,
    connector: Arc<dyn Connector>,
    receiver: mpsc::UnboundedReceiver<Vec<RequestId>>,
}

impl WitnessGcForwarder {
    pub fn new(
        logger: slog::Logger,
        me: &MemberAddress,
        members: &[MemberAddress],
        connector: Arc<dyn Connector>,
        receiver: mpsc::UnboundedReceiver<Vec<RequestId>>,
    ) -> Self {
        let peers = members
            .iter()
            .filter(|m| *m != me)
            .map(|address| Peer {
                address: address.clone(),
                connection: None,
            })
            .collect();

        WitnessGcForwarder {
            logger,
            peers,
            connector,
            receiver,
        }
    }

    pub async fn run(mut self) {
        while let Some(mut synced) = self.receiver.recv().await {
            // Whatever piled up while the last round was in flight goes out together.
            while let Ok(more) = self.receiver.try_recv() {
                synced.extend(more);
            }
            self.broadcast(synced).await;
        }
        slog::debug!(self.logger, "Witness GC forwarder stopped");
    }

    async fn broadcast(&mut self, synced: Vec<RequestId>) {
        for peer in self.peers.iter_mut() {
            if peer.connection.is_none() {
                match self.connector.connect(&peer.address).await {
                    Ok(connection) => peer.connection = Some(connection),
                    Err(e) => {
                        slog::warn!(self.logger, "Skipping witness GC at {}: {}", peer.address, e);
                        continue;
                    }
                }
            }

            if let Some(connection) = peer.connection.as_mut() {
                match connection.witness_gc(WitnessGcRequest::new(synced.clone())).await {
                    Ok(response) => {
                        slog::debug!(
                            self.logger,
                            "{} dropped {} of {} synced commands",
                            peer.address,
                            response.removed,
                            synced.len()
                        );
                    }
                    Err(e) => {
                        slog::warn!(self.logger, "Witness GC at {} failed: {}", peer.address, e);
                        peer.connection = None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_utils::{addresses, test_logger, FakeCluster};
    use crate::messages::{ClientId, SeqNo};
    use tokio::time::Duration;

    fn id(seq: u64) -> RequestId {
        RequestId {
            client_id: ClientId::new(1),
            seq_no: SeqNo::new(seq),
        }
    }

    #[tokio::test]
    async fn synced_ids_reach_every_other_member() {
        let members = addresses(3);
        let cluster = FakeCluster::with_leader(&members, 0);
        let (tx, rx) = mpsc::unbounded_channel();
        let forwarder = WitnessGcForwarder::new(test_logger(), &members[0], &members, Arc::new(cluster.clone()), rx);
        let join_handle = tokio::spawn(forwarder.run());

        tx.send(vec![id(1), id(2)]).unwrap();
        tx.send(vec![id(3)]).unwrap();
        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), join_handle)
            .await
            .expect("forwarder should exit once the sender drops")
            .unwrap();

        assert_eq!(cluster.calls(&members[0]).witness_gc, 0);
        for member in members[1..].iter() {
            assert_eq!(cluster.calls(member).witness_gc_ids, 3);
            // One connection, reused across batches.
            assert_eq!(cluster.calls(member).connects, 1);
        }
    }

    #[tokio::test]
    async fn unreachable_member_does_not_block_the_rest() {
        let members = addresses(3);
        let cluster = FakeCluster::with_leader(&members, 0);
        cluster.update(&members[1], |m| m.reachable = false);
        let (tx, rx) = mpsc::unbounded_channel();
        let forwarder = WitnessGcForwarder::new(test_logger(), &members[0], &members, Arc::new(cluster.clone()), rx);
        let join_handle = tokio::spawn(forwarder.run());

        tx.send(vec![id(1)]).unwrap();
        drop(tx);
        join_handle.await.unwrap();

        assert_eq!(cluster.calls(&members[1]).witness_gc, 0);
        assert_eq!(cluster.calls(&members[2]).witness_gc_ids, 1);
    }

    #[tokio::test]
    async fn failed_connection_is_reopened_for_the_next_batch() {
        let members = addresses(2);
        let cluster = FakeCluster::with_leader(&members, 0);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut forwarder = WitnessGcForwarder::new(test_logger(), &members[0], &members, Arc::new(cluster.clone()), rx);
        drop(tx);

        cluster.update(&members[1], |m| m.malformed = true);
        forwarder.broadcast(vec![id(1)]).await;
        cluster.update(&members[1], |m| m.malformed = false);
        forwarder.broadcast(vec![id(2)]).await;

        assert_eq!(cluster.calls(&members[1]).connects, 2);
        assert_eq!(cluster.calls(&members[1]).witness_gc_ids, 1);
    }
}
