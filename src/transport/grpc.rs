use crate::grpc::grpc_curp_client::GrpcCurpClient;
use crate::grpc::{
    ProtoClientIdReq, ProtoClientReq, ProtoRecordReq, ProtoRecoveryDataReq, ProtoSyncReq, ProtoUnfreezeReq,
    ProtoWitnessGcReq,
};
use crate::messages::{
    ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, MemberAddress, RecordRequest, RecordResponse,
    RecoveryDataRequest, RecoveryDataResponse, SyncRequest, SyncResponse, UnfreezeRequest, UnfreezeResponse,
    WitnessGcRequest, WitnessGcResponse,
};
use crate::transport::{Connection, Connector, TransportError};
use std::convert::TryFrom;
use std::fmt::Debug;
use tokio::time::error::Elapsed;
use tokio::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

/// GrpcConnector opens tonic channels to members listening on `host:port`. Every connect and
/// every exchange is bounded by `rpc_timeout`.
pub struct GrpcConnector {
    logger: slog::Logger,
    rpc_timeout: Duration,
}

impl GrpcConnector {
    pub fn new(logger: slog::Logger, rpc_timeout: Duration) -> Self {
        GrpcConnector { logger, rpc_timeout }
    }
}

#[async_trait::async_trait]
impl Connector for GrpcConnector {
    async fn connect(&self, address: &MemberAddress) -> Result<Box<dyn Connection>, TransportError> {
        let url = format!("http://{}", address);
        slog::debug!(self.logger, "Connecting to {} ...", url);
        let endpoint = Endpoint::from_shared(url)
            .map_err(|e| TransportError::connect(format!("Invalid member address {}: {:?}", address, e)))?;

        let channel = match tokio::time::timeout(self.rpc_timeout, endpoint.connect()).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => return Err(TransportError::connect(format!("{}: {:?}", address, e))),
            Err(_timeout) => return Err(TransportError::connect(format!("{}: timed out", address))),
        };

        Ok(Box::new(GrpcConnection {
            logger: self.logger.new(slog::o!("Member" => address.to_string())),
            client: GrpcCurpClient::new(channel),
            rpc_timeout: self.rpc_timeout,
        }))
    }
}

struct GrpcConnection {
    logger: slog::Logger,
    client: GrpcCurpClient<Channel>,
    rpc_timeout: Duration,
}

impl GrpcConnection {
    fn convert_rpc_reply<T: Debug>(
        logger: &slog::Logger,
        rpc_reply: Result<Result<tonic::Response<T>, Status>, Elapsed>,
    ) -> Result<T, TransportError> {
        slog::debug!(logger, "ClientWire - {:?}", rpc_reply);
        match rpc_reply {
            Ok(Ok(rpc_result)) => Ok(rpc_result.into_inner()),
            Ok(Err(rpc_status)) => Err(TransportError::send(format!(
                "Un-modeled failure from RPC call: {:?}",
                rpc_status
            ))),
            Err(_timeout) => Err(TransportError::send("Timed out waiting for member")),
        }
    }
}

#[async_trait::async_trait]
impl Connection for GrpcConnection {
    async fn client_id(&mut self, request: ClientIdRequest) -> Result<ClientIdResponse, TransportError> {
        let rpc_request = ProtoClientIdReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.client_id(rpc_request)).await;

        Self::convert_rpc_reply(&self.logger, rpc_reply).map(ClientIdResponse::from)
    }

    async fn client_request(&mut self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        let rpc_request = ProtoClientReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.client_request(rpc_request)).await;

        Self::convert_rpc_reply(&self.logger, rpc_reply).map(ClientResponse::from)
    }

    async fn record(&mut self, request: RecordRequest) -> Result<RecordResponse, TransportError> {
        let rpc_request = ProtoRecordReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.record(rpc_request)).await;

        Self::convert_rpc_reply(&self.logger, rpc_reply).map(RecordResponse::from)
    }

    async fn sync(&mut self, request: SyncRequest) -> Result<SyncResponse, TransportError> {
        let rpc_request = ProtoSyncReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.sync(rpc_request)).await;

        Self::convert_rpc_reply(&self.logger, rpc_reply).map(SyncResponse::from)
    }

    async fn recovery_data(&mut self, request: RecoveryDataRequest) -> Result<RecoveryDataResponse, TransportError> {
        let rpc_request = ProtoRecoveryDataReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.recovery_data(rpc_request)).await;

        let rpc_result = Self::convert_rpc_reply(&self.logger, rpc_reply)?;
        Ok(RecoveryDataResponse::try_from(rpc_result)?)
    }

    async fn unfreeze(&mut self, request: UnfreezeRequest) -> Result<UnfreezeResponse, TransportError> {
        let rpc_request = ProtoUnfreezeReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.unfreeze(rpc_request)).await;

        Self::convert_rpc_reply(&self.logger, rpc_reply).map(UnfreezeResponse::from)
    }

    async fn witness_gc(&mut self, request: WitnessGcRequest) -> Result<WitnessGcResponse, TransportError> {
        let rpc_request = ProtoWitnessGcReq::from(request);
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, self.client.witness_gc(rpc_request)).await;

        Self::convert_rpc_reply(&self.logger, rpc_reply).map(WitnessGcResponse::from)
    }
}
