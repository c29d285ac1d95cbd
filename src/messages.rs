//! Wire-level types shared by the client session, the transport, and the replica.
//!
//! These mirror the protobuf messages in `protos/curp.proto`, but use strong types for IDs and
//! optional fields. Conversions live in `transport::proto`.
use bytes::Bytes;
use std::fmt;

/// Highest protocol revision this crate speaks.
pub const PROTOCOL_VERSION_MAX: u32 = 1;

/// RpcHeader is carried on every message. Peers speaking an older revision leave it unset, which
/// reads back as the zero value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RpcHeader {
    pub protocol_version: u32,
}

impl RpcHeader {
    pub fn current() -> Self {
        RpcHeader {
            protocol_version: PROTOCOL_VERSION_MAX,
        }
    }
}

/// ClientId is allocated once per session by the cluster. Zero means "unassigned".
#[derive(Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(id: u64) -> Self {
        ClientId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SeqNo is the per-client sequence number of a command.
#[derive(Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SeqNo(u64);

impl SeqNo {
    pub fn new(seq_no: u64) -> Self {
        SeqNo(seq_no)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SeqNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Term(u64);

impl Term {
    pub fn new(term: u64) -> Self {
        Term(term)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// MemberAddress identifies a cluster member, e.g. `"127.0.0.1:8000"`. Leader hints are matched
/// against the client's member list by exact string equality.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct MemberAddress(String);

impl MemberAddress {
    pub fn new<S: Into<String>>(address: S) -> Self {
        MemberAddress(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for MemberAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MemberAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CommutativityKey is an opaque tag. Two commands whose key sets are disjoint may be applied in
/// either order with the same result.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CommutativityKey(Bytes);

impl CommutativityKey {
    pub fn new<B: Into<Bytes>>(key: B) -> Self {
        CommutativityKey(key.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogType {
    Command,
    Noop,
}

/// RequestId uniquely identifies a command: the `(clientID, seqNo)` pair used for dedup.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct RequestId {
    pub client_id: ClientId,
    pub seq_no: SeqNo,
}

/// LogEntry is a client command as it travels to the leader and the witnesses. Immutable once
/// built.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub log_type: LogType,
    pub data: Bytes,
    pub keys: Vec<CommutativityKey>,
    pub client_id: ClientId,
    pub seq_no: SeqNo,
}

impl LogEntry {
    pub fn command(data: Bytes, keys: Vec<CommutativityKey>, client_id: ClientId, seq_no: SeqNo) -> Self {
        LogEntry {
            log_type: LogType::Command,
            data,
            keys,
            client_id,
            seq_no,
        }
    }

    pub fn id(&self) -> RequestId {
        RequestId {
            client_id: self.client_id,
            seq_no: self.seq_no,
        }
    }

    /// Returns true if neither entry names a key the other one names.
    pub fn commutes_with(&self, other: &LogEntry) -> bool {
        !self.keys.iter().any(|key| other.keys.contains(key))
    }
}

/// LeaderHinted is implemented by every response that a non-leader may answer with a redirect.
pub trait LeaderHinted {
    /// Whether the receiving member accepted the request.
    fn succeeded(&self) -> bool;

    /// Advisory address of the current leader. `None` when the member doesn't know one, which
    /// usually means an election is in progress.
    fn leader_hint(&self) -> Option<&MemberAddress>;
}

// ------- Client ID --------

#[derive(Clone, Debug, PartialEq)]
pub struct ClientIdRequest {
    pub header: RpcHeader,
}

impl ClientIdRequest {
    pub fn new() -> Self {
        ClientIdRequest {
            header: RpcHeader::current(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientIdResponse {
    pub header: RpcHeader,
    pub success: bool,
    pub client_id: ClientId,
    pub leader_hint: Option<MemberAddress>,
}

impl LeaderHinted for ClientIdResponse {
    fn succeeded(&self) -> bool {
        self.success
    }

    fn leader_hint(&self) -> Option<&MemberAddress> {
        self.leader_hint.as_ref()
    }
}

// ------- Client request (leader path) --------

#[derive(Clone, Debug, PartialEq)]
pub struct ClientRequest {
    pub header: RpcHeader,
    pub entry: LogEntry,
}

impl ClientRequest {
    pub fn new(entry: LogEntry) -> Self {
        ClientRequest {
            header: RpcHeader::current(),
            entry,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientResponse {
    pub header: RpcHeader,
    pub success: bool,
    pub leader_hint: Option<MemberAddress>,
    pub response_data: Bytes,
    /// True if the leader already ordered the command durably, making witness records moot.
    pub synced: bool,
}

impl LeaderHinted for ClientResponse {
    fn succeeded(&self) -> bool {
        self.success
    }

    fn leader_hint(&self) -> Option<&MemberAddress> {
        self.leader_hint.as_ref()
    }
}

// ------- Record (witness path) --------

#[derive(Clone, Debug, PartialEq)]
pub struct RecordRequest {
    pub header: RpcHeader,
    pub entry: LogEntry,
    pub term: Term,
}

impl RecordRequest {
    pub fn new(entry: LogEntry, term: Term) -> Self {
        RecordRequest {
            header: RpcHeader::current(),
            entry,
            term,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordResponse {
    pub header: RpcHeader,
    pub success: bool,
    /// The witness's term, so a client with a stale term can catch up.
    pub term: Term,
}

// ------- Sync --------

#[derive(Clone, Debug, PartialEq)]
pub struct SyncRequest {
    pub header: RpcHeader,
    /// The command whose response the caller wants back. A bare sync only forces durability.
    pub entry: Option<LogEntry>,
}

impl SyncRequest {
    pub fn new(entry: Option<LogEntry>) -> Self {
        SyncRequest {
            header: RpcHeader::current(),
            entry,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncResponse {
    pub header: RpcHeader,
    pub success: bool,
    pub leader_hint: Option<MemberAddress>,
    pub response_data: Bytes,
}

impl LeaderHinted for SyncResponse {
    fn succeeded(&self) -> bool {
        self.success
    }

    fn leader_hint(&self) -> Option<&MemberAddress> {
        self.leader_hint.as_ref()
    }
}

// ------- Witness recovery --------

#[derive(Clone, Debug, PartialEq)]
pub struct RecoveryDataRequest {
    pub header: RpcHeader,
}

impl RecoveryDataRequest {
    pub fn new() -> Self {
        RecoveryDataRequest {
            header: RpcHeader::current(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecoveryDataResponse {
    pub header: RpcHeader,
    pub entries: Vec<LogEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnfreezeRequest {
    pub header: RpcHeader,
}

impl UnfreezeRequest {
    pub fn new() -> Self {
        UnfreezeRequest {
            header: RpcHeader::current(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnfreezeResponse {
    pub header: RpcHeader,
}

// ------- Witness GC --------

#[derive(Clone, Debug, PartialEq)]
pub struct WitnessGcRequest {
    pub header: RpcHeader,
    pub synced: Vec<RequestId>,
}

impl WitnessGcRequest {
    pub fn new(synced: Vec<RequestId>) -> Self {
        WitnessGcRequest {
            header: RpcHeader::current(),
            synced,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WitnessGcResponse {
    pub header: RpcHeader,
    /// How many of the synced commands the witness was still holding.
    pub removed: u64,
}
