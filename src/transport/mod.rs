//! The point-to-point connection abstraction the client core is written against.
mod grpc;
mod proto;

pub use grpc::GrpcConnector;
pub use proto::MalformedMessage;

use crate::messages::{
    ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, MemberAddress, RecordRequest, RecordResponse,
    RecoveryDataRequest, RecoveryDataResponse, SyncRequest, SyncResponse, UnfreezeRequest, UnfreezeResponse,
    WitnessGcRequest, WitnessGcResponse,
};

/// Connector opens connections to cluster members.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, address: &MemberAddress) -> Result<Box<dyn Connection>, TransportError>;
}

/// Connection is one request/response channel to a single member. Callers hold exclusive access
/// for a full exchange, so an impl never has to multiplex.
#[async_trait::async_trait]
pub trait Connection: Send {
    async fn client_id(&mut self, request: ClientIdRequest) -> Result<ClientIdResponse, TransportError>;

    async fn client_request(&mut self, request: ClientRequest) -> Result<ClientResponse, TransportError>;

    async fn record(&mut self, request: RecordRequest) -> Result<RecordResponse, TransportError>;

    async fn sync(&mut self, request: SyncRequest) -> Result<SyncResponse, TransportError>;

    async fn recovery_data(&mut self, request: RecoveryDataRequest) -> Result<RecoveryDataResponse, TransportError>;

    async fn unfreeze(&mut self, request: UnfreezeRequest) -> Result<UnfreezeResponse, TransportError>;

    async fn witness_gc(&mut self, request: WitnessGcRequest) -> Result<WitnessGcResponse, TransportError>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransportErrorKind {
    /// Couldn't open a connection to the member.
    Connect,
    /// The exchange failed on an open connection (IO error, timeout, server fault).
    Send,
    /// The member answered with something that can't be decoded into a response.
    Malformed,
}

#[derive(Debug, thiserror::Error)]
#[error("{kind:?} failure: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn connect<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    pub fn send<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Send, message)
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Malformed, message)
    }

    fn new<S: Into<String>>(kind: TransportErrorKind, message: S) -> Self {
        TransportError {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

impl From<MalformedMessage> for TransportError {
    fn from(e: MalformedMessage) -> Self {
        TransportError::malformed(e.to_string())
    }
}
