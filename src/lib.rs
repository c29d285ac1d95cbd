mod actor;
mod client;
mod kv;
mod messages;
mod replica;
mod server;
mod shutdown;
mod transport;
mod grpc {
    include!("../generated/curp.rs");
}

pub use actor::ActorExited;
pub use client::try_create_session;
pub use client::CommandOutput;
pub use client::CommitPath;
pub use client::CurpClient;
pub use client::RetryPolicy;
pub use client::Session;
pub use client::SessionConfig;
pub use client::SessionError;
pub use client::SessionOptions;
pub use client::WitnessSelection;
pub use kv::KvClient;
pub use kv::KvCommand;
pub use kv::KvError;
pub use kv::KvResult;
pub use kv::KvStateMachine;
pub use messages::ClientId;
pub use messages::ClientIdRequest;
pub use messages::ClientIdResponse;
pub use messages::ClientRequest;
pub use messages::ClientResponse;
pub use messages::CommutativityKey;
pub use messages::LeaderHinted;
pub use messages::LogEntry;
pub use messages::LogType;
pub use messages::MemberAddress;
pub use messages::RecordRequest;
pub use messages::RecordResponse;
pub use messages::RecoveryDataRequest;
pub use messages::RecoveryDataResponse;
pub use messages::RequestId;
pub use messages::RpcHeader;
pub use messages::SeqNo;
pub use messages::SyncRequest;
pub use messages::SyncResponse;
pub use messages::Term;
pub use messages::UnfreezeRequest;
pub use messages::UnfreezeResponse;
pub use messages::WitnessGcRequest;
pub use messages::WitnessGcResponse;
pub use messages::PROTOCOL_VERSION_MAX;
pub use replica::try_create_replica;
pub use replica::CachedResponse;
pub use replica::ReplicaConfig;
pub use replica::ReplicaCreationError;
pub use replica::ReplicaHandle;
pub use replica::ReplicaOptions;
pub use replica::ResponseCache;
pub use replica::StateMachine;
pub use replica::StateMachineOutput;
pub use transport::Connection;
pub use transport::Connector;
pub use transport::GrpcConnector;
pub use transport::MalformedMessage;
pub use transport::TransportError;
pub use transport::TransportErrorKind;
