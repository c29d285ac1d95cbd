use crate::messages::{
    ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, MemberAddress, RecordRequest, RecordResponse,
    RecoveryDataRequest, RecoveryDataResponse, RequestId, SyncRequest, SyncResponse, Term, UnfreezeRequest,
    UnfreezeResponse,
};
use crate::replica::{Replica, StateMachine};
use std::fmt::Debug;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

/// Synced ids go out on `witness_gc_sender`, when given, so the other members' witnesses can
/// forget them.
pub(crate) fn create<M: StateMachine>(
    logger: slog::Logger,
    buffer_size: usize,
    replica: Replica<M>,
    witness_gc_sender: Option<mpsc::UnboundedSender<Vec<RequestId>>>,
) -> (ActorClient, ReplicaActor<M>) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let client = ActorClient { sender: tx };
    let actor = ReplicaActor {
        logger,
        receiver: rx,
        replica,
        witness_gc_sender,
    };

    (client, actor)
}

// Every replica mutation goes through this queue, so the replica itself needs no locking. The
// response cache is the exception: the GC task sweeps it concurrently.
#[derive(Debug)]
enum Event {
    // Leader: allocate. Others: redirect.
    ClientId(ClientIdRequest, Callback<ClientIdResponse>),
    // Leader: execute once, answer speculatively or sync on conflict. Others: redirect.
    ClientRequest(ClientRequest, Callback<ClientResponse>),
    // Any member: record in the witness if it commutes with what's held.
    Record(RecordRequest, Callback<RecordResponse>),
    // Leader: make everything durable. Others: redirect.
    Sync(SyncRequest, Callback<SyncResponse>),
    RecoveryData(RecoveryDataRequest, Callback<RecoveryDataResponse>),
    Unfreeze(UnfreezeRequest, Callback<UnfreezeResponse>),
    LeadershipChange(Option<MemberAddress>, Term, Callback<()>),
    WitnessGc(Vec<RequestId>, Callback<usize>),
}

#[derive(Debug)]
struct Callback<O: Debug>(oneshot::Sender<O>);

impl<O: Debug> Callback<O> {
    fn send(self, message: O) {
        // Caller gave up waiting; nothing to do.
        let _ = self.0.send(message);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Replica event loop has exited")]
pub struct ActorExited;

#[derive(Clone)]
pub(crate) struct ActorClient {
    sender: mpsc::Sender<Event>,
}

impl ActorClient {
    pub async fn client_id(&self, request: ClientIdRequest) -> Result<ClientIdResponse, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::ClientId(request, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn client_request(&self, request: ClientRequest) -> Result<ClientResponse, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::ClientRequest(request, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn record(&self, request: RecordRequest) -> Result<RecordResponse, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Record(request, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn sync(&self, request: SyncRequest) -> Result<SyncResponse, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Sync(request, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn recovery_data(&self, request: RecoveryDataRequest) -> Result<RecoveryDataResponse, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::RecoveryData(request, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn unfreeze(&self, request: UnfreezeRequest) -> Result<UnfreezeResponse, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Unfreeze(request, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn leadership_change(&self, leader: Option<MemberAddress>, term: Term) -> Result<(), ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::LeadershipChange(leader, term, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub async fn witness_gc(&self, synced: Vec<RequestId>) -> Result<usize, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::WitnessGc(synced, Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    async fn send(&self, event: Event) -> Result<(), ActorExited> {
        self.sender.send(event).await.map_err(|_| ActorExited)
    }
}

/// ReplicaActor is replica logic in actor model.
pub(crate) struct ReplicaActor<M: StateMachine> {
    logger: slog::Logger,
    receiver: mpsc::Receiver<Event>,
    replica: Replica<M>,
    witness_gc_sender: Option<mpsc::UnboundedSender<Vec<RequestId>>>,
}

impl<M: StateMachine> ReplicaActor<M> {
    pub async fn run_event_loop(mut self) {
        loop {
            let event = if self.replica.has_unsynced() {
                // Speculative commands commit as soon as the queue runs dry.
                match self.receiver.try_recv() {
                    Ok(event) => event,
                    Err(TryRecvError::Empty) => {
                        self.replica.commit_unsynced();
                        self.forward_witness_gc();
                        continue;
                    }
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match self.receiver.recv().await {
                    Some(event) => event,
                    None => break,
                }
            };

            self.handle_event(event);
            self.forward_witness_gc();
        }
        slog::info!(self.logger, "Replica event loop exited");
    }

    fn forward_witness_gc(&mut self) {
        let synced = self.replica.take_pending_witness_gc();
        if synced.is_empty() {
            return;
        }

        if let Some(sender) = &self.witness_gc_sender {
            if sender.send(synced).is_err() {
                slog::warn!(self.logger, "Witness GC forwarder is gone. Other witnesses won't be collected.");
                self.witness_gc_sender = None;
            }
        }
    }

    // This must NOT be async. Anything slow belongs in another task.
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::ClientId(request, callback) => {
                callback.send(self.replica.handle_client_id(request));
            }
            Event::ClientRequest(request, callback) => {
                callback.send(self.replica.handle_client_request(request));
            }
            Event::Record(request, callback) => {
                callback.send(self.replica.handle_record(request));
            }
            Event::Sync(request, callback) => {
                callback.send(self.replica.handle_sync(request));
            }
            Event::RecoveryData(request, callback) => {
                callback.send(self.replica.handle_recovery_data(request));
            }
            Event::Unfreeze(request, callback) => {
                callback.send(self.replica.handle_unfreeze(request));
            }
            Event::LeadershipChange(leader, term, callback) => {
                self.replica.handle_leadership_change(leader, term);
                callback.send(());
            }
            Event::WitnessGc(synced, callback) => {
                callback.send(self.replica.handle_witness_gc(synced));
            }
        }
    }
}
