use crate::messages::{ClientId, SeqNo};
use std::sync::atomic::{AtomicU64, Ordering};

/// ClientIdentity scopes a session's sequence numbers. The ID is fixed once the cluster assigns it.
pub(crate) struct ClientIdentity {
    client_id: ClientId,
    next_seq_no: AtomicU64,
}

impl ClientIdentity {
    pub fn new(client_id: ClientId, first_seq_no: u64) -> Self {
        ClientIdentity {
            client_id,
            next_seq_no: AtomicU64::new(first_seq_no),
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Never hands out the same number twice, whether or not the command it was used for succeeds.
    pub fn next_seq_no(&self) -> SeqNo {
        SeqNo::new(self.next_seq_no.fetch_add(1, Ordering::SeqCst))
    }
}
