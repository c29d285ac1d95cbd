use tokio::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Cluster member list is empty")]
    EmptyCluster,
    #[error("Illegal options for configuring session: {0}")]
    IllegalOptions(String),
    #[error("No cluster member is reachable")]
    NoActiveServers,
    #[error("Tried every cluster member without finding an active leader")]
    NoActiveLeader,
    #[error("Malformed response from cluster: {0}")]
    MalformedResponse(String),
    #[error("Leader changed while recording at witnesses")]
    LeaderChanged,
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<SessionError>,
    },
    #[error("Deadline of {0:?} elapsed before the command was committed")]
    DeadlineExceeded(Duration),
    #[error("Session is closed")]
    SessionClosed,
}
