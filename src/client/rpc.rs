use crate::messages::{
    ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, RecordRequest, RecordResponse, SyncRequest,
    SyncResponse,
};
use crate::transport::{Connection, TransportError};
use std::fmt::Debug;

/// Rpc pairs a request type with the `Connection` method that carries it, so the pool and the
/// leader locator can be generic over the exchange.
#[async_trait::async_trait]
pub(crate) trait Rpc: Debug + Send + Sync {
    type Response: Debug + Send;

    async fn call(&self, connection: &mut dyn Connection) -> Result<Self::Response, TransportError>;
}

#[async_trait::async_trait]
impl Rpc for ClientIdRequest {
    type Response = ClientIdResponse;

    async fn call(&self, connection: &mut dyn Connection) -> Result<Self::Response, TransportError> {
        connection.client_id(self.clone()).await
    }
}

#[async_trait::async_trait]
impl Rpc for ClientRequest {
    type Response = ClientResponse;

    async fn call(&self, connection: &mut dyn Connection) -> Result<Self::Response, TransportError> {
        connection.client_request(self.clone()).await
    }
}

#[async_trait::async_trait]
impl Rpc for RecordRequest {
    type Response = RecordResponse;

    async fn call(&self, connection: &mut dyn Connection) -> Result<Self::Response, TransportError> {
        connection.record(self.clone()).await
    }
}

#[async_trait::async_trait]
impl Rpc for SyncRequest {
    type Response = SyncResponse;

    async fn call(&self, connection: &mut dyn Connection) -> Result<Self::Response, TransportError> {
        connection.sync(self.clone()).await
    }
}
