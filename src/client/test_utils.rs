use crate::messages::{
    ClientId, ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, MemberAddress, RecordRequest,
    RecordResponse, RecoveryDataRequest, RecoveryDataResponse, RpcHeader, SyncRequest, SyncResponse, Term,
    UnfreezeRequest, UnfreezeResponse, WitnessGcRequest, WitnessGcResponse,
};
use crate::transport::{Connection, Connector, TransportError};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) fn test_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

pub(crate) fn addresses(n: usize) -> Vec<MemberAddress> {
    (0..n).map(|i| MemberAddress::new(format!("member-{}", i))).collect()
}

/// Per-member behaviour of the fake cluster. Tests flip these between calls.
#[derive(Clone, Debug)]
pub(crate) struct FakeMember {
    pub reachable: bool,
    pub is_leader: bool,
    pub leader_hint: Option<MemberAddress>,
    pub synced: bool,
    pub record_accepts: bool,
    pub witness_term: u64,
    pub sync_succeeds: bool,
    pub malformed: bool,
    pub calls: CallCounts,
}

impl Default for FakeMember {
    fn default() -> Self {
        FakeMember {
            reachable: true,
            is_leader: false,
            leader_hint: None,
            synced: false,
            record_accepts: true,
            witness_term: 0,
            sync_succeeds: true,
            malformed: false,
            calls: CallCounts::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CallCounts {
    pub connects: usize,
    pub client_id: usize,
    pub client_request: usize,
    pub record: usize,
    pub sync: usize,
    pub witness_gc: usize,
    pub witness_gc_ids: usize,
}

/// FakeCluster is a scripted in-process cluster. Cloning it shares the member state, so the test
/// keeps one copy and hands the other to the session as its `Connector`.
#[derive(Clone)]
pub(crate) struct FakeCluster {
    members: Arc<HashMap<MemberAddress, Arc<Mutex<FakeMember>>>>,
}

impl FakeCluster {
    /// Member `leader` leads; every other member redirects to it.
    pub fn with_leader(addresses: &[MemberAddress], leader: usize) -> Self {
        let members = addresses
            .iter()
            .enumerate()
            .map(|(i, address)| {
                let member = FakeMember {
                    is_leader: i == leader,
                    leader_hint: Some(addresses[leader].clone()),
                    ..Default::default()
                };
                (address.clone(), Arc::new(Mutex::new(member)))
            })
            .collect();

        FakeCluster {
            members: Arc::new(members),
        }
    }

    pub fn update<F: FnOnce(&mut FakeMember)>(&self, address: &MemberAddress, f: F) {
        let mut member = self.members[address].lock().unwrap();
        f(&mut member);
    }

    pub fn update_all<F: Fn(&mut FakeMember)>(&self, f: F) {
        for member in self.members.values() {
            f(&mut member.lock().unwrap());
        }
    }

    pub fn calls(&self, address: &MemberAddress) -> CallCounts {
        self.members[address].lock().unwrap().calls.clone()
    }

    pub fn move_leadership(&self, addresses: &[MemberAddress], new_leader: usize) {
        for (i, address) in addresses.iter().enumerate() {
            self.update(address, |m| {
                m.is_leader = i == new_leader;
                m.leader_hint = Some(addresses[new_leader].clone());
            });
        }
    }
}

#[async_trait::async_trait]
impl Connector for FakeCluster {
    async fn connect(&self, address: &MemberAddress) -> Result<Box<dyn Connection>, TransportError> {
        let member = match self.members.get(address) {
            Some(m) => m.clone(),
            None => return Err(TransportError::connect(format!("unknown member {}", address))),
        };

        let mut state = member.lock().unwrap();
        state.calls.connects += 1;
        if !state.reachable {
            return Err(TransportError::connect(format!("{} is down", address)));
        }
        drop(state);

        Ok(Box::new(FakeConnection { member }))
    }
}

struct FakeConnection {
    member: Arc<Mutex<FakeMember>>,
}

impl FakeConnection {
    fn with_member<T, F: FnOnce(&mut FakeMember) -> T>(&self, f: F) -> Result<T, TransportError> {
        let mut member = self.member.lock().unwrap();
        if !member.reachable {
            return Err(TransportError::send("connection reset"));
        }
        if member.malformed {
            return Err(TransportError::malformed("garbage on the wire"));
        }
        Ok(f(&mut member))
    }
}

fn response_data_for(request: &ClientRequest) -> Bytes {
    Bytes::from(format!("resp-{}", request.entry.seq_no.as_u64()))
}

#[async_trait::async_trait]
impl Connection for FakeConnection {
    async fn client_id(&mut self, _request: ClientIdRequest) -> Result<ClientIdResponse, TransportError> {
        self.with_member(|m| {
            m.calls.client_id += 1;
            ClientIdResponse {
                header: RpcHeader::current(),
                success: m.is_leader,
                client_id: ClientId::new(if m.is_leader { 42 } else { 0 }),
                leader_hint: m.leader_hint.clone(),
            }
        })
    }

    async fn client_request(&mut self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        self.with_member(|m| {
            m.calls.client_request += 1;
            ClientResponse {
                header: RpcHeader::current(),
                success: m.is_leader,
                leader_hint: m.leader_hint.clone(),
                response_data: response_data_for(&request),
                synced: m.synced,
            }
        })
    }

    async fn record(&mut self, request: RecordRequest) -> Result<RecordResponse, TransportError> {
        self.with_member(|m| {
            m.calls.record += 1;
            RecordResponse {
                header: RpcHeader::current(),
                success: m.record_accepts && request.term.as_u64() == m.witness_term,
                term: Term::new(m.witness_term),
            }
        })
    }

    async fn sync(&mut self, _request: SyncRequest) -> Result<SyncResponse, TransportError> {
        self.with_member(|m| {
            m.calls.sync += 1;
            SyncResponse {
                header: RpcHeader::current(),
                success: m.is_leader && m.sync_succeeds,
                leader_hint: m.leader_hint.clone(),
                response_data: Bytes::new(),
            }
        })
    }

    async fn recovery_data(&mut self, _request: RecoveryDataRequest) -> Result<RecoveryDataResponse, TransportError> {
        self.with_member(|_| RecoveryDataResponse {
            header: RpcHeader::current(),
            entries: vec![],
        })
    }

    async fn unfreeze(&mut self, _request: UnfreezeRequest) -> Result<UnfreezeResponse, TransportError> {
        self.with_member(|_| UnfreezeResponse {
            header: RpcHeader::current(),
        })
    }

    async fn witness_gc(&mut self, request: WitnessGcRequest) -> Result<WitnessGcResponse, TransportError> {
        self.with_member(|m| {
            m.calls.witness_gc += 1;
            m.calls.witness_gc_ids += request.synced.len();
            WitnessGcResponse {
                header: RpcHeader::current(),
                removed: 0,
            }
        })
    }
}
