use crate::messages::{
    ClientId, ClientIdRequest, ClientIdResponse, ClientRequest, ClientResponse, LogEntry, LogType, MemberAddress,
    RecordRequest, RecordResponse, RecoveryDataRequest, RecoveryDataResponse, RequestId, RpcHeader, SyncRequest,
    SyncResponse, Term, UnfreezeRequest, UnfreezeResponse,
};
use crate::replica::response_cache::ResponseCache;
use crate::replica::state_machine::StateMachine;
use crate::replica::witness::{RecordOutcome, Witness};
use bytes::Bytes;
use std::sync::Arc;

pub(crate) struct ReplicaInit<M: StateMachine> {
    pub logger: slog::Logger,
    pub me: MemberAddress,
    pub leader: Option<MemberAddress>,
    pub term: Term,
    pub state_machine: M,
    pub response_cache: Arc<ResponseCache>,
}

/// Replica is one cluster member. Leadership is handed to it from outside (the consensus engine
/// owns elections); given that, it plays leader or witness for the client protocol.
///
/// As leader it executes commands speculatively: a command that commutes with everything not yet
/// synced is answered with `synced = false`, and one that conflicts forces a sync first.
pub(crate) struct Replica<M: StateMachine> {
    logger: slog::Logger,
    me: MemberAddress,
    leader: Option<MemberAddress>,
    term: Term,
    next_client_id: u64,
    state_machine: M,
    response_cache: Arc<ResponseCache>,
    witness: Witness,
    unsynced: Vec<LogEntry>,
    // Synced ids the other members' witnesses haven't been told about yet.
    pending_witness_gc: Vec<RequestId>,
}

impl<M: StateMachine> Replica<M> {
    pub fn new(config: ReplicaInit<M>) -> Self {
        Replica {
            logger: config.logger,
            me: config.me,
            leader: config.leader,
            term: config.term,
            // Zero is "unassigned" on the wire.
            next_client_id: 1,
            state_machine: config.state_machine,
            response_cache: config.response_cache,
            witness: Witness::new(config.term),
            unsynced: Vec::new(),
            pending_witness_gc: Vec::new(),
        }
    }

    fn is_leader(&self) -> bool {
        self.leader.as_ref() == Some(&self.me)
    }

    pub fn handle_client_id(&mut self, _request: ClientIdRequest) -> ClientIdResponse {
        if !self.is_leader() {
            return ClientIdResponse {
                header: RpcHeader::current(),
                success: false,
                client_id: ClientId::default(),
                leader_hint: self.leader.clone(),
            };
        }

        let client_id = ClientId::new(self.next_client_id);
        self.next_client_id += 1;
        slog::info!(self.logger, "Assigned client ID {:?}", client_id);

        ClientIdResponse {
            header: RpcHeader::current(),
            success: true,
            client_id,
            leader_hint: Some(self.me.clone()),
        }
    }

    pub fn handle_client_request(&mut self, request: ClientRequest) -> ClientResponse {
        if !self.is_leader() {
            return ClientResponse {
                header: RpcHeader::current(),
                success: false,
                leader_hint: self.leader.clone(),
                response_data: Bytes::new(),
                synced: false,
            };
        }

        let entry = request.entry;
        let id = entry.id();
        let retransmission = self.response_cache.lookup(entry.client_id, entry.seq_no).is_some();
        let response_data = self.apply_once(&entry);

        let synced = if entry.log_type == LogType::Noop {
            true
        } else if retransmission {
            !self.unsynced.iter().any(|e| e.id() == id)
        } else if self.unsynced.iter().all(|e| e.commutes_with(&entry)) {
            self.unsynced.push(entry);
            false
        } else {
            slog::info!(self.logger, "{:?} conflicts with unsynced commands. Syncing.", id);
            self.sync_all();
            true
        };

        ClientResponse {
            header: RpcHeader::current(),
            success: true,
            leader_hint: Some(self.me.clone()),
            response_data,
            synced,
        }
    }

    pub fn handle_record(&mut self, request: RecordRequest) -> RecordResponse {
        let id = request.entry.id();
        let outcome = self.witness.record(request.entry, request.term);
        if outcome != RecordOutcome::Accepted {
            slog::debug!(
                self.logger,
                "Not recording {:?}: {:?}. Witness holds {} entries.",
                id,
                outcome,
                self.witness.len()
            );
        }

        RecordResponse {
            header: RpcHeader::current(),
            success: outcome == RecordOutcome::Accepted,
            term: self.witness.term(),
        }
    }

    pub fn handle_sync(&mut self, request: SyncRequest) -> SyncResponse {
        if !self.is_leader() {
            return SyncResponse {
                header: RpcHeader::current(),
                success: false,
                leader_hint: self.leader.clone(),
                response_data: Bytes::new(),
            };
        }

        // A sync for a command this leader never saw (e.g. it was sent to the previous leader)
        // executes it here first.
        let response_data = match &request.entry {
            Some(entry) => self.apply_once(entry),
            None => Bytes::new(),
        };
        self.sync_all();

        SyncResponse {
            header: RpcHeader::current(),
            success: true,
            leader_hint: Some(self.me.clone()),
            response_data,
        }
    }

    pub fn handle_recovery_data(&mut self, _request: RecoveryDataRequest) -> RecoveryDataResponse {
        let entries = self.witness.recovery_data();
        slog::info!(self.logger, "Witness frozen. Handing over {} entries.", entries.len());

        RecoveryDataResponse {
            header: RpcHeader::current(),
            entries,
        }
    }

    pub fn handle_unfreeze(&mut self, _request: UnfreezeRequest) -> UnfreezeResponse {
        self.witness.unfreeze();
        slog::info!(self.logger, "Witness unfrozen.");

        UnfreezeResponse {
            header: RpcHeader::current(),
        }
    }

    pub fn handle_leadership_change(&mut self, leader: Option<MemberAddress>, term: Term) {
        let was_leader = self.is_leader();
        self.leader = leader;
        self.term = term;
        self.witness.set_term(term);

        if was_leader && !self.is_leader() {
            // The next leader recovers these from the witnesses.
            self.unsynced.clear();
        }
        slog::info!(self.logger, "Leader is now {:?} at term {:?}", self.leader, self.term);
    }

    pub fn handle_witness_gc(&mut self, synced: Vec<RequestId>) -> usize {
        self.witness.gc(&synced)
    }

    pub fn has_unsynced(&self) -> bool {
        !self.unsynced.is_empty()
    }

    /// Stands in for the consensus layer committing the speculatively executed commands. The
    /// event loop calls it whenever it has nothing else queued.
    pub fn commit_unsynced(&mut self) {
        self.sync_all();
    }

    /// Hands out the ids to garbage collect at the other witnesses, and forgets them.
    pub fn take_pending_witness_gc(&mut self) -> Vec<RequestId> {
        std::mem::take(&mut self.pending_witness_gc)
    }

    /// Executes `entry` unless this replica already did, and returns its response either way.
    fn apply_once(&mut self, entry: &LogEntry) -> Bytes {
        if entry.log_type == LogType::Noop {
            return Bytes::new();
        }
        if let Some(cached) = self.response_cache.lookup(entry.client_id, entry.seq_no) {
            slog::debug!(self.logger, "Returning cached response for {:?}", entry.id());
            return cached.response;
        }

        let response = self.state_machine.apply_command(entry.data.clone()).into_bytes();
        self.response_cache
            .record(entry.client_id, entry.seq_no, response)
            .response
    }

    fn sync_all(&mut self) {
        if self.unsynced.is_empty() {
            return;
        }

        let synced: Vec<RequestId> = self.unsynced.drain(..).map(|e| e.id()).collect();
        // Our own witness no longer needs to hold them.
        self.witness.gc(&synced);
        slog::debug!(self.logger, "Synced {} commands", synced.len());
        self.pending_witness_gc.extend(synced);
    }
}
