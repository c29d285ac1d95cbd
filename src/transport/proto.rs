use crate::grpc::{
    ProtoClientIdReq, ProtoClientIdResult, ProtoClientReq, ProtoClientResult, ProtoLogEntry, ProtoLogType,
    ProtoRecordReq, ProtoRecordResult, ProtoRecoveryDataReq, ProtoRecoveryDataResult, ProtoRequestId, ProtoRpcHeader,
    ProtoSyncReq, ProtoSyncResult, ProtoUnfreezeReq, ProtoUnfreezeResult, ProtoWitnessGcReq, ProtoWitnessGcResult,
};
use crate::messages::{
    ClientId, ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, CommutativityKey, LogEntry, LogType,
    MemberAddress, RecordRequest, RecordResponse, RecoveryDataRequest, RecoveryDataResponse, RequestId, RpcHeader,
    SeqNo, SyncRequest, SyncResponse, Term, UnfreezeRequest, UnfreezeResponse, WitnessGcRequest, WitnessGcResponse,
};
use bytes::Bytes;
use std::convert::TryFrom;

#[derive(Debug, thiserror::Error)]
#[error("Malformed message: {0}")]
pub struct MalformedMessage(pub(crate) String);

// ------- Shared pieces --------

fn header_from_proto(proto_header: Option<ProtoRpcHeader>) -> RpcHeader {
    // Older peers don't send a header at all.
    proto_header
        .map(|h| RpcHeader {
            protocol_version: h.protocol_version,
        })
        .unwrap_or_default()
}

fn header_to_proto(header: RpcHeader) -> Option<ProtoRpcHeader> {
    Some(ProtoRpcHeader {
        protocol_version: header.protocol_version,
    })
}

fn hint_from_proto(leader_hint: String) -> Option<MemberAddress> {
    match leader_hint.is_empty() {
        true => None,
        false => Some(MemberAddress::new(leader_hint)),
    }
}

fn hint_to_proto(leader_hint: Option<MemberAddress>) -> String {
    leader_hint.map(MemberAddress::into_inner).unwrap_or_default()
}

impl From<LogEntry> for ProtoLogEntry {
    fn from(entry: LogEntry) -> Self {
        let log_type = match entry.log_type {
            LogType::Command => ProtoLogType::Command,
            LogType::Noop => ProtoLogType::Noop,
        };

        ProtoLogEntry {
            log_type: log_type as i32,
            data: entry.data.to_vec(),
            keys: entry.keys.iter().map(|k| k.as_bytes().to_vec()).collect(),
            client_id: entry.client_id.as_u64(),
            seq_no: entry.seq_no.as_u64(),
        }
    }
}

impl TryFrom<ProtoLogEntry> for LogEntry {
    type Error = MalformedMessage;

    fn try_from(proto_entry: ProtoLogEntry) -> Result<Self, Self::Error> {
        let log_type = match ProtoLogType::from_i32(proto_entry.log_type) {
            Some(ProtoLogType::Command) => LogType::Command,
            Some(ProtoLogType::Noop) => LogType::Noop,
            None => {
                return Err(MalformedMessage(format!(
                    "Unknown log entry type {}",
                    proto_entry.log_type
                )))
            }
        };

        Ok(LogEntry {
            log_type,
            data: Bytes::from(proto_entry.data),
            keys: proto_entry
                .keys
                .into_iter()
                .map(|k| CommutativityKey::new(Bytes::from(k)))
                .collect(),
            client_id: ClientId::new(proto_entry.client_id),
            seq_no: SeqNo::new(proto_entry.seq_no),
        })
    }
}

fn required_entry(proto_entry: Option<ProtoLogEntry>, message_name: &str) -> Result<LogEntry, MalformedMessage> {
    match proto_entry {
        Some(e) => LogEntry::try_from(e),
        None => Err(MalformedMessage(format!("{} is missing its log entry", message_name))),
    }
}

// ------- Client ID --------

impl From<ClientIdRequest> for ProtoClientIdReq {
    fn from(request: ClientIdRequest) -> Self {
        ProtoClientIdReq {
            header: header_to_proto(request.header),
        }
    }
}

impl From<ProtoClientIdReq> for ClientIdRequest {
    fn from(rpc_request: ProtoClientIdReq) -> Self {
        ClientIdRequest {
            header: header_from_proto(rpc_request.header),
        }
    }
}

impl From<ClientIdResponse> for ProtoClientIdResult {
    fn from(response: ClientIdResponse) -> Self {
        ProtoClientIdResult {
            header: header_to_proto(response.header),
            success: response.success,
            client_id: response.client_id.as_u64(),
            leader_hint: hint_to_proto(response.leader_hint),
        }
    }
}

impl From<ProtoClientIdResult> for ClientIdResponse {
    fn from(rpc_result: ProtoClientIdResult) -> Self {
        ClientIdResponse {
            header: header_from_proto(rpc_result.header),
            success: rpc_result.success,
            client_id: ClientId::new(rpc_result.client_id),
            leader_hint: hint_from_proto(rpc_result.leader_hint),
        }
    }
}

// ------- Client request --------

impl From<ClientRequest> for ProtoClientReq {
    fn from(request: ClientRequest) -> Self {
        ProtoClientReq {
            header: header_to_proto(request.header),
            entry: Some(ProtoLogEntry::from(request.entry)),
        }
    }
}

impl TryFrom<ProtoClientReq> for ClientRequest {
    type Error = MalformedMessage;

    fn try_from(rpc_request: ProtoClientReq) -> Result<Self, Self::Error> {
        Ok(ClientRequest {
            header: header_from_proto(rpc_request.header),
            entry: required_entry(rpc_request.entry, "ClientRequest")?,
        })
    }
}

impl From<ClientResponse> for ProtoClientResult {
    fn from(response: ClientResponse) -> Self {
        ProtoClientResult {
            header: header_to_proto(response.header),
            success: response.success,
            leader_hint: hint_to_proto(response.leader_hint),
            response_data: response.response_data.to_vec(),
            synced: response.synced,
        }
    }
}

impl From<ProtoClientResult> for ClientResponse {
    fn from(rpc_result: ProtoClientResult) -> Self {
        ClientResponse {
            header: header_from_proto(rpc_result.header),
            success: rpc_result.success,
            leader_hint: hint_from_proto(rpc_result.leader_hint),
            response_data: Bytes::from(rpc_result.response_data),
            synced: rpc_result.synced,
        }
    }
}

// ------- Record --------

impl From<RecordRequest> for ProtoRecordReq {
    fn from(request: RecordRequest) -> Self {
        ProtoRecordReq {
            header: header_to_proto(request.header),
            entry: Some(ProtoLogEntry::from(request.entry)),
            term: request.term.as_u64(),
        }
    }
}

impl TryFrom<ProtoRecordReq> for RecordRequest {
    type Error = MalformedMessage;

    fn try_from(rpc_request: ProtoRecordReq) -> Result<Self, Self::Error> {
        Ok(RecordRequest {
            header: header_from_proto(rpc_request.header),
            entry: required_entry(rpc_request.entry, "RecordRequest")?,
            term: Term::new(rpc_request.term),
        })
    }
}

impl From<RecordResponse> for ProtoRecordResult {
    fn from(response: RecordResponse) -> Self {
        ProtoRecordResult {
            header: header_to_proto(response.header),
            success: response.success,
            term: response.term.as_u64(),
        }
    }
}

impl From<ProtoRecordResult> for RecordResponse {
    fn from(rpc_result: ProtoRecordResult) -> Self {
        RecordResponse {
            header: header_from_proto(rpc_result.header),
            success: rpc_result.success,
            term: Term::new(rpc_result.term),
        }
    }
}

// ------- Sync --------

impl From<SyncRequest> for ProtoSyncReq {
    fn from(request: SyncRequest) -> Self {
        ProtoSyncReq {
            header: header_to_proto(request.header),
            entry: request.entry.map(ProtoLogEntry::from),
        }
    }
}

impl TryFrom<ProtoSyncReq> for SyncRequest {
    type Error = MalformedMessage;

    fn try_from(rpc_request: ProtoSyncReq) -> Result<Self, Self::Error> {
        let entry = match rpc_request.entry {
            Some(e) => Some(LogEntry::try_from(e)?),
            None => None,
        };

        Ok(SyncRequest {
            header: header_from_proto(rpc_request.header),
            entry,
        })
    }
}

impl From<SyncResponse> for ProtoSyncResult {
    fn from(response: SyncResponse) -> Self {
        ProtoSyncResult {
            header: header_to_proto(response.header),
            success: response.success,
            leader_hint: hint_to_proto(response.leader_hint),
            response_data: response.response_data.to_vec(),
        }
    }
}

impl From<ProtoSyncResult> for SyncResponse {
    fn from(rpc_result: ProtoSyncResult) -> Self {
        SyncResponse {
            header: header_from_proto(rpc_result.header),
            success: rpc_result.success,
            leader_hint: hint_from_proto(rpc_result.leader_hint),
            response_data: Bytes::from(rpc_result.response_data),
        }
    }
}

// ------- Recovery --------

impl From<RecoveryDataRequest> for ProtoRecoveryDataReq {
    fn from(request: RecoveryDataRequest) -> Self {
        ProtoRecoveryDataReq {
            header: header_to_proto(request.header),
        }
    }
}

impl From<ProtoRecoveryDataReq> for RecoveryDataRequest {
    fn from(rpc_request: ProtoRecoveryDataReq) -> Self {
        RecoveryDataRequest {
            header: header_from_proto(rpc_request.header),
        }
    }
}

impl From<RecoveryDataResponse> for ProtoRecoveryDataResult {
    fn from(response: RecoveryDataResponse) -> Self {
        ProtoRecoveryDataResult {
            header: header_to_proto(response.header),
            entries: response.entries.into_iter().map(ProtoLogEntry::from).collect(),
        }
    }
}

impl TryFrom<ProtoRecoveryDataResult> for RecoveryDataResponse {
    type Error = MalformedMessage;

    fn try_from(rpc_result: ProtoRecoveryDataResult) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(rpc_result.entries.len());
        for proto_entry in rpc_result.entries {
            entries.push(LogEntry::try_from(proto_entry)?);
        }

        Ok(RecoveryDataResponse {
            header: header_from_proto(rpc_result.header),
            entries,
        })
    }
}

impl From<UnfreezeRequest> for ProtoUnfreezeReq {
    fn from(request: UnfreezeRequest) -> Self {
        ProtoUnfreezeReq {
            header: header_to_proto(request.header),
        }
    }
}

impl From<ProtoUnfreezeReq> for UnfreezeRequest {
    fn from(rpc_request: ProtoUnfreezeReq) -> Self {
        UnfreezeRequest {
            header: header_from_proto(rpc_request.header),
        }
    }
}

impl From<UnfreezeResponse> for ProtoUnfreezeResult {
    fn from(response: UnfreezeResponse) -> Self {
        ProtoUnfreezeResult {
            header: header_to_proto(response.header),
        }
    }
}

impl From<ProtoUnfreezeResult> for UnfreezeResponse {
    fn from(rpc_result: ProtoUnfreezeResult) -> Self {
        UnfreezeResponse {
            header: header_from_proto(rpc_result.header),
        }
    }
}

// ------- Witness GC --------

impl From<RequestId> for ProtoRequestId {
    fn from(id: RequestId) -> Self {
        ProtoRequestId {
            client_id: id.client_id.as_u64(),
            seq_no: id.seq_no.as_u64(),
        }
    }
}

impl From<ProtoRequestId> for RequestId {
    fn from(proto_id: ProtoRequestId) -> Self {
        RequestId {
            client_id: ClientId::new(proto_id.client_id),
            seq_no: SeqNo::new(proto_id.seq_no),
        }
    }
}

impl From<WitnessGcRequest> for ProtoWitnessGcReq {
    fn from(request: WitnessGcRequest) -> Self {
        ProtoWitnessGcReq {
            header: header_to_proto(request.header),
            synced: request.synced.into_iter().map(ProtoRequestId::from).collect(),
        }
    }
}

impl From<ProtoWitnessGcReq> for WitnessGcRequest {
    fn from(rpc_request: ProtoWitnessGcReq) -> Self {
        WitnessGcRequest {
            header: header_from_proto(rpc_request.header),
            synced: rpc_request.synced.into_iter().map(RequestId::from).collect(),
        }
    }
}

impl From<WitnessGcResponse> for ProtoWitnessGcResult {
    fn from(response: WitnessGcResponse) -> Self {
        ProtoWitnessGcResult {
            header: header_to_proto(response.header),
            removed: response.removed,
        }
    }
}

impl From<ProtoWitnessGcResult> for WitnessGcResponse {
    fn from(rpc_result: ProtoWitnessGcResult) -> Self {
        WitnessGcResponse {
            header: header_from_proto(rpc_result.header),
            removed: rpc_result.removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_reads_as_protocol_version_zero() {
        let response = ClientResponse::from(ProtoClientResult {
            header: None,
            success: true,
            leader_hint: String::new(),
            response_data: vec![],
            synced: false,
        });
        assert_eq!(response.header, RpcHeader::default());
    }

    #[test]
    fn empty_leader_hint_reads_as_none() {
        let response = SyncResponse::from(ProtoSyncResult {
            header: None,
            success: false,
            leader_hint: String::new(),
            response_data: vec![],
        });
        assert_eq!(response.leader_hint, None);

        let response = SyncResponse::from(ProtoSyncResult {
            header: None,
            success: false,
            leader_hint: "10.0.0.1:9000".into(),
            response_data: vec![],
        });
        assert_eq!(response.leader_hint, Some(MemberAddress::new("10.0.0.1:9000")));
    }

    #[test]
    fn client_request_without_entry_is_malformed() {
        let result = ClientRequest::try_from(ProtoClientReq {
            header: None,
            entry: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn unknown_log_type_is_malformed() {
        let result = LogEntry::try_from(ProtoLogEntry {
            log_type: 42,
            data: vec![],
            keys: vec![],
            client_id: 1,
            seq_no: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn log_entry_keeps_identity_and_keys_across_the_wire() {
        let entry = LogEntry::command(
            Bytes::from_static(b"payload"),
            vec![CommutativityKey::new("foo"), CommutativityKey::new("bar")],
            ClientId::new(3),
            SeqNo::new(99),
        );

        let decoded = LogEntry::try_from(ProtoLogEntry::from(entry.clone())).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn witness_gc_request_keeps_request_ids() {
        let synced = vec![
            RequestId {
                client_id: ClientId::new(1),
                seq_no: SeqNo::new(4),
            },
            RequestId {
                client_id: ClientId::new(2),
                seq_no: SeqNo::new(0),
            },
        ];

        let decoded = WitnessGcRequest::from(ProtoWitnessGcReq::from(WitnessGcRequest::new(synced.clone())));
        assert_eq!(decoded.synced, synced);
    }
}
