#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRpcHeader {
    #[prost(uint32, tag="1")]
    pub protocol_version: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogEntry {
    #[prost(enumeration="ProtoLogType", tag="1")]
    pub log_type: i32,
    #[prost(bytes="vec", tag="2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes="vec", repeated, tag="3")]
    pub keys: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint64, tag="4")]
    pub client_id: u64,
    #[prost(uint64, tag="5")]
    pub seq_no: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoClientIdReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoClientIdResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(bool, tag="2")]
    pub success: bool,
    #[prost(uint64, tag="3")]
    pub client_id: u64,
    #[prost(string, tag="4")]
    pub leader_hint: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoClientReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(message, optional, tag="2")]
    pub entry: ::core::option::Option<ProtoLogEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoClientResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(bool, tag="2")]
    pub success: bool,
    #[prost(string, tag="3")]
    pub leader_hint: ::prost::alloc::string::String,
    #[prost(bytes="vec", tag="4")]
    pub response_data: ::prost::alloc::vec::Vec<u8>,
    #[prost(bool, tag="5")]
    pub synced: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRecordReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(message, optional, tag="2")]
    pub entry: ::core::option::Option<ProtoLogEntry>,
    #[prost(uint64, tag="3")]
    pub term: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRecordResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(bool, tag="2")]
    pub success: bool,
    #[prost(uint64, tag="3")]
    pub term: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSyncReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(message, optional, tag="2")]
    pub entry: ::core::option::Option<ProtoLogEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSyncResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(bool, tag="2")]
    pub success: bool,
    #[prost(string, tag="3")]
    pub leader_hint: ::prost::alloc::string::String,
    #[prost(bytes="vec", tag="4")]
    pub response_data: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRecoveryDataReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRecoveryDataResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(message, repeated, tag="2")]
    pub entries: ::prost::alloc::vec::Vec<ProtoLogEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUnfreezeReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUnfreezeResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRequestId {
    #[prost(uint64, tag="1")]
    pub client_id: u64,
    #[prost(uint64, tag="2")]
    pub seq_no: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWitnessGcReq {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(message, repeated, tag="2")]
    pub synced: ::prost::alloc::vec::Vec<ProtoRequestId>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWitnessGcResult {
    #[prost(message, optional, tag="1")]
    pub header: ::core::option::Option<ProtoRpcHeader>,
    #[prost(uint64, tag="2")]
    pub removed: u64,
}
/// Key-value state machine commands, carried as opaque log entry data.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoKvCommand {
    #[prost(oneof="proto_kv_command::Op", tags="1, 2, 3")]
    pub op: ::core::option::Option<proto_kv_command::Op>,
}
/// Nested message and enum types in `ProtoKvCommand`.
pub mod proto_kv_command {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Op {
        #[prost(message, tag="1")]
        Get(super::ProtoKvGet),
        #[prost(message, tag="2")]
        Set(super::ProtoKvSet),
        #[prost(message, tag="3")]
        Inc(super::ProtoKvInc),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoKvGet {
    #[prost(string, tag="1")]
    pub key: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoKvSet {
    #[prost(string, tag="1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag="2")]
    pub value: ::prost::alloc::string::String,
}
/// Nothing
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoKvInc {
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoKvResult {
    #[prost(string, tag="1")]
    pub value: ::prost::alloc::string::String,
    #[prost(uint64, tag="2")]
    pub counter: u64,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtoLogType {
    Command = 0,
    Noop = 1,
}
# [doc = r" Generated client implementations."] pub mod grpc_curp_client { # ! [allow (unused_variables , dead_code , missing_docs)] use tonic :: codegen :: * ; # [doc = " Client-facing protocol of a CURP cluster. Every message carries a header so that peers speaking"] # [doc = " an older revision read absent fields as zero."] pub struct GrpcCurpClient < T > { inner : tonic :: client :: Grpc < T > , } impl GrpcCurpClient < tonic :: transport :: Channel > { # [doc = r" Attempt to create a new client by connecting to a given endpoint."] pub async fn connect < D > (dst : D) -> Result < Self , tonic :: transport :: Error > where D : std :: convert :: TryInto < tonic :: transport :: Endpoint > , D :: Error : Into < StdError > , { let conn = tonic :: transport :: Endpoint :: new (dst) ? . connect () . await ? ; Ok (Self :: new (conn)) } } impl < T > GrpcCurpClient < T > where T : tonic :: client :: GrpcService < tonic :: body :: BoxBody > , T :: ResponseBody : Body + HttpBody + Send + 'static , T :: Error : Into < StdError > , < T :: ResponseBody as HttpBody > :: Error : Into < StdError > + Send , { pub fn new (inner : T) -> Self { let inner = tonic :: client :: Grpc :: new (inner) ; Self { inner } } pub fn with_interceptor (inner : T , interceptor : impl Into < tonic :: Interceptor >) -> Self { let inner = tonic :: client :: Grpc :: with_interceptor (inner , interceptor) ; Self { inner } } # [doc = " Client -> any member. Allocates a fresh client ID (leader only)."] pub async fn client_id (& mut self , request : impl tonic :: IntoRequest < super :: ProtoClientIdReq > ,) -> Result < tonic :: Response < super :: ProtoClientIdResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/ClientId") ; self . inner . unary (request . into_request () , path , codec) . await } # [doc = " Client -> leader. Applies a command through the normal consensus path."] pub async fn client_request (& mut self , request : impl tonic :: IntoRequest < super :: ProtoClientReq > ,) -> Result < tonic :: Response < super :: ProtoClientResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/ClientRequest") ; self . inner . unary (request . into_request () , path , codec) . await } # [doc = " Client -> witness. Records a command so it survives a leader crash."] pub async fn record (& mut self , request : impl tonic :: IntoRequest < super :: ProtoRecordReq > ,) -> Result < tonic :: Response < super :: ProtoRecordResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/Record") ; self . inner . unary (request . into_request () , path , codec) . await } # [doc = " Client -> leader. Forces the leader to durably order all speculative commands."] pub async fn sync (& mut self , request : impl tonic :: IntoRequest < super :: ProtoSyncReq > ,) -> Result < tonic :: Response < super :: ProtoSyncResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/Sync") ; self . inner . unary (request . into_request () , path , codec) . await } # [doc = " New leader -> witness. Freezes the witness and drains its recorded commands."] pub async fn recovery_data (& mut self , request : impl tonic :: IntoRequest < super :: ProtoRecoveryDataReq > ,) -> Result < tonic :: Response < super :: ProtoRecoveryDataResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/RecoveryData") ; self . inner . unary (request . into_request () , path , codec) . await } # [doc = " New leader -> witness. Re-enables recording after recovery."] pub async fn unfreeze (& mut self , request : impl tonic :: IntoRequest < super :: ProtoUnfreezeReq > ,) -> Result < tonic :: Response < super :: ProtoUnfreezeResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/Unfreeze") ; self . inner . unary (request . into_request () , path , codec) . await } # [doc = " Leader -> witness. Drops recorded commands the leader has synced."] pub async fn witness_gc (& mut self , request : impl tonic :: IntoRequest < super :: ProtoWitnessGcReq > ,) -> Result < tonic :: Response < super :: ProtoWitnessGcResult > , tonic :: Status > { self . inner . ready () . await . map_err (| e | { tonic :: Status :: new (tonic :: Code :: Unknown , format ! ("Service was not ready: {}" , e . into ())) }) ? ; let codec = tonic :: codec :: ProstCodec :: default () ; let path = http :: uri :: PathAndQuery :: from_static ("/curp.GrpcCurp/WitnessGc") ; self . inner . unary (request . into_request () , path , codec) . await } } impl < T : Clone > Clone for GrpcCurpClient < T > { fn clone (& self) -> Self { Self { inner : self . inner . clone () , } } } impl < T > std :: fmt :: Debug for GrpcCurpClient < T > { fn fmt (& self , f : & mut std :: fmt :: Formatter < '_ >) -> std :: fmt :: Result { write ! (f , "GrpcCurpClient {{ ... }}") } } }# [doc = r" Generated server implementations."] pub mod grpc_curp_server { # ! [allow (unused_variables , dead_code , missing_docs)] use tonic :: codegen :: * ; # [doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcCurpServer."] # [async_trait] pub trait GrpcCurp : Send + Sync + 'static { # [doc = " Client -> any member. Allocates a fresh client ID (leader only)."] async fn client_id (& self , request : tonic :: Request < super :: ProtoClientIdReq >) -> Result < tonic :: Response < super :: ProtoClientIdResult > , tonic :: Status > ; # [doc = " Client -> leader. Applies a command through the normal consensus path."] async fn client_request (& self , request : tonic :: Request < super :: ProtoClientReq >) -> Result < tonic :: Response < super :: ProtoClientResult > , tonic :: Status > ; # [doc = " Client -> witness. Records a command so it survives a leader crash."] async fn record (& self , request : tonic :: Request < super :: ProtoRecordReq >) -> Result < tonic :: Response < super :: ProtoRecordResult > , tonic :: Status > ; # [doc = " Client -> leader. Forces the leader to durably order all speculative commands."] async fn sync (& self , request : tonic :: Request < super :: ProtoSyncReq >) -> Result < tonic :: Response < super :: ProtoSyncResult > , tonic :: Status > ; # [doc = " New leader -> witness. Freezes the witness and drains its recorded commands."] async fn recovery_data (& self , request : tonic :: Request < super :: ProtoRecoveryDataReq >) -> Result < tonic :: Response < super :: ProtoRecoveryDataResult > , tonic :: Status > ; # [doc = " New leader -> witness. Re-enables recording after recovery."] async fn unfreeze (& self , request : tonic :: Request < super :: ProtoUnfreezeReq >) -> Result < tonic :: Response < super :: ProtoUnfreezeResult > , tonic :: Status > ; # [doc = " Leader -> witness. Drops recorded commands the leader has synced."] async fn witness_gc (& self , request : tonic :: Request < super :: ProtoWitnessGcReq >) -> Result < tonic :: Response < super :: ProtoWitnessGcResult > , tonic :: Status > ; } # [doc = " Client-facing protocol of a CURP cluster. Every message carries a header so that peers speaking"] # [doc = " an older revision read absent fields as zero."] # [derive (Debug)] pub struct GrpcCurpServer < T : GrpcCurp > { inner : _Inner < T > , } struct _Inner < T > (Arc < T > , Option < tonic :: Interceptor >) ; impl < T : GrpcCurp > GrpcCurpServer < T > { pub fn new (inner : T) -> Self { let inner = Arc :: new (inner) ; let inner = _Inner (inner , None) ; Self { inner } } pub fn with_interceptor (inner : T , interceptor : impl Into < tonic :: Interceptor >) -> Self { let inner = Arc :: new (inner) ; let inner = _Inner (inner , Some (interceptor . into ())) ; Self { inner } } } impl < T , B > Service < http :: Request < B >> for GrpcCurpServer < T > where T : GrpcCurp , B : HttpBody + Send + Sync + 'static , B :: Error : Into < StdError > + Send + 'static , { type Response = http :: Response < tonic :: body :: BoxBody > ; type Error = Never ; type Future = BoxFuture < Self :: Response , Self :: Error > ; fn poll_ready (& mut self , _cx : & mut Context < '_ >) -> Poll < Result < () , Self :: Error >> { Poll :: Ready (Ok (())) } fn call (& mut self , req : http :: Request < B >) -> Self :: Future { let inner = self . inner . clone () ; match req . uri () . path () { "/curp.GrpcCurp/ClientId" => { # [allow (non_camel_case_types)] struct ClientIdSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoClientIdReq > for ClientIdSvc < T > { type Response = super :: ProtoClientIdResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoClientIdReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . client_id (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = ClientIdSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } "/curp.GrpcCurp/ClientRequest" => { # [allow (non_camel_case_types)] struct ClientRequestSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoClientReq > for ClientRequestSvc < T > { type Response = super :: ProtoClientResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoClientReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . client_request (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = ClientRequestSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } "/curp.GrpcCurp/Record" => { # [allow (non_camel_case_types)] struct RecordSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoRecordReq > for RecordSvc < T > { type Response = super :: ProtoRecordResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoRecordReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . record (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = RecordSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } "/curp.GrpcCurp/Sync" => { # [allow (non_camel_case_types)] struct SyncSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoSyncReq > for SyncSvc < T > { type Response = super :: ProtoSyncResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoSyncReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . sync (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = SyncSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } "/curp.GrpcCurp/RecoveryData" => { # [allow (non_camel_case_types)] struct RecoveryDataSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoRecoveryDataReq > for RecoveryDataSvc < T > { type Response = super :: ProtoRecoveryDataResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoRecoveryDataReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . recovery_data (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = RecoveryDataSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } "/curp.GrpcCurp/Unfreeze" => { # [allow (non_camel_case_types)] struct UnfreezeSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoUnfreezeReq > for UnfreezeSvc < T > { type Response = super :: ProtoUnfreezeResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoUnfreezeReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . unfreeze (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = UnfreezeSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } "/curp.GrpcCurp/WitnessGc" => { # [allow (non_camel_case_types)] struct WitnessGcSvc < T : GrpcCurp > (pub Arc < T >) ; impl < T : GrpcCurp > tonic :: server :: UnaryService < super :: ProtoWitnessGcReq > for WitnessGcSvc < T > { type Response = super :: ProtoWitnessGcResult ; type Future = BoxFuture < tonic :: Response < Self :: Response > , tonic :: Status > ; fn call (& mut self , request : tonic :: Request < super :: ProtoWitnessGcReq >) -> Self :: Future { let inner = self . 0 . clone () ; let fut = async move { (* inner) . witness_gc (request) . await } ; Box :: pin (fut) } } let inner = self . inner . clone () ; let fut = async move { let interceptor = inner . 1 . clone () ; let inner = inner . 0 ; let method = WitnessGcSvc (inner) ; let codec = tonic :: codec :: ProstCodec :: default () ; let mut grpc = if let Some (interceptor) = interceptor { tonic :: server :: Grpc :: with_interceptor (codec , interceptor) } else { tonic :: server :: Grpc :: new (codec) } ; let res = grpc . unary (method , req) . await ; Ok (res) } ; Box :: pin (fut) } _ => Box :: pin (async move { Ok (http :: Response :: builder () . status (200) . header ("grpc-status" , "12") . header ("content-type" , "application/grpc") . body (tonic :: body :: BoxBody :: empty ()) . unwrap ()) }) , } } } impl < T : GrpcCurp > Clone for GrpcCurpServer < T > { fn clone (& self) -> Self { let inner = self . inner . clone () ; Self { inner } } } impl < T : GrpcCurp > Clone for _Inner < T > { fn clone (& self) -> Self { Self (self . 0 . clone () , self . 1 . clone ()) } } impl < T : std :: fmt :: Debug > std :: fmt :: Debug for _Inner < T > { fn fmt (& self , f : & mut std :: fmt :: Formatter < '_ >) -> std :: fmt :: Result { write ! (f , "{:?}" , self . 0) } } impl < T : GrpcCurp > tonic :: transport :: NamedService for GrpcCurpServer < T > { const NAME : & 'static str = "curp.GrpcCurp" ; } }