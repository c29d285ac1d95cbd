use crate::actor::{self, ActorClient, ActorExited};
use crate::messages::{MemberAddress, RequestId, Term};
use crate::replica::options::{ReplicaOptions, ReplicaOptionsValidated};
use crate::replica::{Replica, ReplicaInit};
use crate::replica::response_cache::ResponseCache;
use crate::replica::response_cache_gc::ResponseCacheGcHandle;
use crate::replica::state_machine::StateMachine;
use crate::replica::witness_gc::WitnessGcForwarder;
use crate::server::RpcServer;
use crate::shutdown::{self, ShutdownHandle};
use crate::transport::GrpcConnector;
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct ReplicaConfig<M: StateMachine> {
    /// `host:port` this replica serves on. Clients must list it the same way.
    pub my_address: MemberAddress,
    /// Every member of the cluster, this one included. While leading, synced commands are
    /// garbage collected from the others' witnesses.
    pub members: Vec<MemberAddress>,
    pub initial_leader: Option<MemberAddress>,
    pub initial_term: Term,
    pub state_machine: M,
    pub info_logger: slog::Logger,
    pub options: ReplicaOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplicaCreationError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),
    #[error("Illegal options for configuring replica: {0}")]
    IllegalOptions(String),
}

/// ReplicaHandle keeps a running replica alive. Dropping it stops the server and the GC task; the
/// event loop exits once the server lets go of it.
pub struct ReplicaHandle {
    actor_client: ActorClient,
    response_cache: Arc<ResponseCache>,
    _response_cache_gc: ResponseCacheGcHandle,
    _server_shutdown: ShutdownHandle,
}

impl ReplicaHandle {
    /// Tells the replica who leads now, as decided by the consensus engine.
    pub async fn change_leader(&self, leader: Option<MemberAddress>, term: Term) -> Result<(), ActorExited> {
        self.actor_client.leadership_change(leader, term).await
    }

    /// Drops witness entries reported as synced by a leader outside this crate's event loop.
    /// Returns how many were held.
    pub async fn gc_witness(&self, synced: Vec<RequestId>) -> Result<usize, ActorExited> {
        self.actor_client.witness_gc(synced).await
    }

    /// The dedup cache the apply path consults.
    pub fn response_cache(&self) -> &Arc<ResponseCache> {
        &self.response_cache
    }
}

/// Starts a replica: its event loop, the response cache GC, the witness GC forwarder, and a gRPC
/// server on `my_address`. Must be called from within a tokio runtime.
pub fn try_create_replica<M: StateMachine>(config: ReplicaConfig<M>) -> Result<ReplicaHandle, ReplicaCreationError> {
    let options = ReplicaOptionsValidated::try_from(config.options)
        .map_err(|e| ReplicaCreationError::IllegalOptions(e.to_string()))?;
    let my_address = config.my_address;
    let socket_addr: SocketAddr = my_address
        .as_str()
        .parse()
        .map_err(|_| ReplicaCreationError::InvalidAddress(my_address.to_string()))?;

    let root_logger = config
        .info_logger
        .new(slog::o!("Replica" => my_address.to_string()));

    let response_cache = Arc::new(ResponseCache::new(options.response_cache_retention));
    let response_cache_gc = ResponseCacheGcHandle::spawn_gc_task(
        root_logger.new(slog::o!("Component" => "ResponseCacheGc")),
        &response_cache,
        options.response_cache_gc_interval,
    );

    let (witness_gc_sender, witness_gc_receiver) = mpsc::unbounded_channel();
    let witness_gc_logger = root_logger.new(slog::o!("Component" => "WitnessGc"));
    let witness_gc = WitnessGcForwarder::new(
        witness_gc_logger.clone(),
        &my_address,
        &config.members,
        Arc::new(GrpcConnector::new(witness_gc_logger, options.peer_rpc_timeout)),
        witness_gc_receiver,
    );
    tokio::spawn(witness_gc.run());

    let replica = Replica::new(ReplicaInit {
        logger: root_logger.clone(),
        me: my_address,
        leader: config.initial_leader,
        term: config.initial_term,
        state_machine: config.state_machine,
        response_cache: response_cache.clone(),
    });
    let (actor_client, replica_actor) = actor::create(root_logger.clone(), 64, replica, Some(witness_gc_sender));
    tokio::spawn(replica_actor.run_event_loop());

    let (server_shutdown_handle, server_shutdown_signal) = shutdown::shutdown_signal();
    let server = RpcServer::new(root_logger, actor_client.clone());
    tokio::spawn(server.run(socket_addr, server_shutdown_signal));

    Ok(ReplicaHandle {
        actor_client,
        response_cache,
        _response_cache_gc: response_cache_gc,
        _server_shutdown: server_shutdown_handle,
    })
}
