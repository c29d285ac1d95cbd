use crate::actor::{ActorClient, ActorExited};
use crate::grpc::grpc_curp_server::{GrpcCurp, GrpcCurpServer};
use crate::grpc::{
    ProtoClientIdReq, ProtoClientIdResult, ProtoClientReq, ProtoClientResult, ProtoRecordReq, ProtoRecordResult,
    ProtoRecoveryDataReq, ProtoRecoveryDataResult, ProtoSyncReq, ProtoSyncResult, ProtoUnfreezeReq,
    ProtoUnfreezeResult, ProtoWitnessGcReq, ProtoWitnessGcResult,
};
use crate::messages::{
    ClientIdRequest, ClientRequest, RecordRequest, RecoveryDataRequest, RpcHeader, SyncRequest, UnfreezeRequest,
    WitnessGcRequest, WitnessGcResponse,
};
use crate::shutdown::ShutdownSignal;
use crate::transport::MalformedMessage;
use std::convert::TryFrom;
use std::net::SocketAddr;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// RpcServer is the type that implements the CURP gRPC interface on top of a replica event loop.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    replica: ActorClient,
}

impl RpcServer {
    pub fn new(logger: slog::Logger, replica: ActorClient) -> Self {
        RpcServer { logger, replica }
    }

    pub async fn run(self, socket_addr: SocketAddr, shutdown_signal: ShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcCurpServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal)
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    async fn handle_client_id(&self, rpc_request: ProtoClientIdReq) -> Result<ProtoClientIdResult, Status> {
        let app_input = ClientIdRequest::from(rpc_request);
        let app_output = self.replica.client_id(app_input).await.map_err(convert_actor_exited)?;
        Ok(ProtoClientIdResult::from(app_output))
    }

    async fn handle_client_request(&self, rpc_request: ProtoClientReq) -> Result<ProtoClientResult, Status> {
        let app_input = ClientRequest::try_from(rpc_request).map_err(convert_malformed)?;
        let app_output = self
            .replica
            .client_request(app_input)
            .await
            .map_err(convert_actor_exited)?;
        Ok(ProtoClientResult::from(app_output))
    }

    async fn handle_record(&self, rpc_request: ProtoRecordReq) -> Result<ProtoRecordResult, Status> {
        let app_input = RecordRequest::try_from(rpc_request).map_err(convert_malformed)?;
        let app_output = self.replica.record(app_input).await.map_err(convert_actor_exited)?;
        Ok(ProtoRecordResult::from(app_output))
    }

    async fn handle_sync(&self, rpc_request: ProtoSyncReq) -> Result<ProtoSyncResult, Status> {
        let app_input = SyncRequest::try_from(rpc_request).map_err(convert_malformed)?;
        let app_output = self.replica.sync(app_input).await.map_err(convert_actor_exited)?;
        Ok(ProtoSyncResult::from(app_output))
    }

    async fn handle_recovery_data(
        &self,
        rpc_request: ProtoRecoveryDataReq,
    ) -> Result<ProtoRecoveryDataResult, Status> {
        let app_input = RecoveryDataRequest::from(rpc_request);
        let app_output = self
            .replica
            .recovery_data(app_input)
            .await
            .map_err(convert_actor_exited)?;
        Ok(ProtoRecoveryDataResult::from(app_output))
    }

    async fn handle_unfreeze(&self, rpc_request: ProtoUnfreezeReq) -> Result<ProtoUnfreezeResult, Status> {
        let app_input = UnfreezeRequest::from(rpc_request);
        let app_output = self.replica.unfreeze(app_input).await.map_err(convert_actor_exited)?;
        Ok(ProtoUnfreezeResult::from(app_output))
    }

    async fn handle_witness_gc(&self, rpc_request: ProtoWitnessGcReq) -> Result<ProtoWitnessGcResult, Status> {
        let app_input = WitnessGcRequest::from(rpc_request);
        let removed = self
            .replica
            .witness_gc(app_input.synced)
            .await
            .map_err(convert_actor_exited)?;
        Ok(ProtoWitnessGcResult::from(WitnessGcResponse {
            header: RpcHeader::current(),
            removed: removed as u64,
        }))
    }
}

fn convert_malformed(e: MalformedMessage) -> Status {
    Status::invalid_argument(e.to_string())
}

fn convert_actor_exited(e: ActorExited) -> Status {
    Status::unavailable(e.to_string())
}

#[async_trait::async_trait]
impl GrpcCurp for RpcServer {
    async fn client_id(&self, rpc_request_wrapped: Request<ProtoClientIdReq>) -> Result<Response<ProtoClientIdResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_client_id(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn client_request(
        &self,
        rpc_request_wrapped: Request<ProtoClientReq>,
    ) -> Result<Response<ProtoClientResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_client_request(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn record(&self, rpc_request_wrapped: Request<ProtoRecordReq>) -> Result<Response<ProtoRecordResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_record(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn sync(&self, rpc_request_wrapped: Request<ProtoSyncReq>) -> Result<Response<ProtoSyncResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_sync(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn recovery_data(
        &self,
        rpc_request_wrapped: Request<ProtoRecoveryDataReq>,
    ) -> Result<Response<ProtoRecoveryDataResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_recovery_data(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn unfreeze(
        &self,
        rpc_request_wrapped: Request<ProtoUnfreezeReq>,
    ) -> Result<Response<ProtoUnfreezeResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_unfreeze(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn witness_gc(
        &self,
        rpc_request_wrapped: Request<ProtoWitnessGcReq>,
    ) -> Result<Response<ProtoWitnessGcResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_witness_gc(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }
}
