use bytes::Bytes;

/// StateMachine is the application that executes client commands.
pub trait StateMachine: Send + 'static {
    /// Executes one command and returns its response. The replica calls this at most once per
    /// `(client ID, seq no)`: retransmissions get the response cached from the first call, so the
    /// impl need not be idempotent.
    ///
    /// The leader may execute a command before it is synced, in any order relative to other
    /// commands whose commutativity keys are disjoint from it.
    fn apply_command(&mut self, command: Bytes) -> StateMachineOutput;
}

pub enum StateMachineOutput {
    Data(Bytes),
    NoData,
}

impl StateMachineOutput {
    pub(crate) fn into_bytes(self) -> Bytes {
        match self {
            StateMachineOutput::Data(data) => data,
            StateMachineOutput::NoData => Bytes::new(),
        }
    }
}
