use crate::client::connection_pool::ConnectionPool;
use crate::client::error::SessionError;
use crate::client::identity::ClientIdentity;
use crate::client::leader_locator::LeaderLocator;
use crate::client::options::SessionOptionsValidated;
use crate::client::witness;
use crate::messages::{ClientId, ClientRequest, CommutativityKey, LogEntry, SeqNo, SyncRequest};
use bytes::Bytes;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// How a command came to be considered committed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommitPath {
    /// The leader executed it and every witness recorded it.
    WitnessQuorum,
    /// The leader reported the command as already durably ordered.
    LeaderSynced,
    /// Witnesses couldn't agree, so the client forced a sync at the leader.
    ExplicitSync,
    /// Sent with `send_request`, which skips the witnesses.
    LeaderOnly,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandOutput {
    pub seq_no: SeqNo,
    pub response_data: Bytes,
    pub commit_path: CommitPath,
}

/// Why one attempt of the protocol didn't produce an answer.
enum AttemptFailure {
    /// Start over with the same command.
    Retryable(SessionError),
    Fatal(SessionError),
}

#[derive(Copy, Clone)]
enum Dispatch {
    Fast,
    LeaderOnly,
}

/// Session is one client's connection to the cluster. Commands may be issued concurrently from
/// many tasks; they share the pooled connections and the leader guess.
pub struct Session {
    logger: slog::Logger,
    pool: Arc<ConnectionPool>,
    leader: LeaderLocator,
    identity: ClientIdentity,
    witness_term: Arc<AtomicU64>,
    options: SessionOptionsValidated,
}

impl Session {
    pub(crate) fn new(
        logger: slog::Logger,
        pool: Arc<ConnectionPool>,
        leader: LeaderLocator,
        identity: ClientIdentity,
        options: SessionOptionsValidated,
    ) -> Self {
        Session {
            logger,
            pool,
            leader,
            identity,
            witness_term: Arc::new(AtomicU64::new(0)),
            options,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.identity.client_id()
    }

    /// Commits a command through the witness fast path, using the session's next sequence number.
    pub async fn send_fast(&self, payload: Bytes, keys: Vec<CommutativityKey>) -> Result<CommandOutput, SessionError> {
        let seq_no = self.identity.next_seq_no();
        self.send_fast_with_seq_no(payload, keys, seq_no).await
    }

    /// Like `send_fast` but with a caller-chosen sequence number. Reusing one makes the cluster
    /// answer with the response it cached the first time.
    pub async fn send_fast_with_seq_no(
        &self,
        payload: Bytes,
        keys: Vec<CommutativityKey>,
        seq_no: SeqNo,
    ) -> Result<CommandOutput, SessionError> {
        let entry = LogEntry::command(payload, keys, self.client_id(), seq_no);
        self.run_protocol(entry, Dispatch::Fast).await
    }

    /// Sends the command to the leader only, without recording it at any witness.
    pub async fn send_request(&self, payload: Bytes, keys: Vec<CommutativityKey>) -> Result<CommandOutput, SessionError> {
        let seq_no = self.identity.next_seq_no();
        self.send_request_with_seq_no(payload, keys, seq_no).await
    }

    pub async fn send_request_with_seq_no(
        &self,
        payload: Bytes,
        keys: Vec<CommutativityKey>,
        seq_no: SeqNo,
    ) -> Result<CommandOutput, SessionError> {
        let entry = LogEntry::command(payload, keys, self.client_id(), seq_no);
        self.run_protocol(entry, Dispatch::LeaderOnly).await
    }

    /// Drops every pooled connection. Calls in flight finish; later calls fail with
    /// `SessionError::SessionClosed`.
    pub async fn close(&self) {
        slog::info!(self.logger, "Closing session");
        self.pool.close().await;
    }

    async fn run_protocol(&self, entry: LogEntry, dispatch: Dispatch) -> Result<CommandOutput, SessionError> {
        match self.options.retry_policy.deadline {
            None => self.retry_loop(&entry, dispatch).await,
            Some(deadline) => match tokio::time::timeout(deadline, self.retry_loop(&entry, dispatch)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(SessionError::DeadlineExceeded(deadline)),
            },
        }
    }

    async fn retry_loop(&self, entry: &LogEntry, dispatch: Dispatch) -> Result<CommandOutput, SessionError> {
        let policy = self.options.retry_policy;
        let logger = self.logger.new(slog::o!("SeqNo" => entry.seq_no.as_u64()));
        let mut attempts = 0;

        loop {
            if self.pool.is_closed() {
                return Err(SessionError::SessionClosed);
            }

            attempts += 1;
            let attempt = match dispatch {
                Dispatch::Fast => self.try_fast_path(&logger, entry).await,
                Dispatch::LeaderOnly => self.try_leader_only(entry).await,
            };

            match attempt {
                Ok(output) => return Ok(output),
                Err(AttemptFailure::Fatal(e)) => return Err(e),
                Err(AttemptFailure::Retryable(cause)) => {
                    slog::info!(logger, "Attempt {} failed: {}", attempts, cause);
                    if let Some(max_attempts) = policy.max_attempts {
                        if attempts >= max_attempts {
                            return Err(SessionError::RetriesExhausted {
                                attempts,
                                last: Box::new(cause),
                            });
                        }
                    }
                }
            }

            tokio::time::sleep(policy.backoff).await;
        }
    }

    async fn try_fast_path(&self, logger: &slog::Logger, entry: &LogEntry) -> Result<CommandOutput, AttemptFailure> {
        let leader_guess = self.leader.current_guess();
        let witnesses = self.options.witness_selection.witnesses(self.pool.len(), leader_guess);
        let request = ClientRequest::new(entry.clone());

        let (leader_result, accepted) = tokio::join!(
            self.leader.send_to_leader(&self.pool, &request),
            witness::record_at_witnesses(logger, &self.pool, &witnesses, entry, &self.witness_term),
        );

        let response = leader_result.map_err(classify)?;
        if self.leader.current_guess() != leader_guess {
            // The witness set was picked against a stale guess.
            return Err(AttemptFailure::Retryable(SessionError::LeaderChanged));
        }

        if response.synced {
            return Ok(CommandOutput {
                seq_no: entry.seq_no,
                response_data: response.response_data,
                commit_path: CommitPath::LeaderSynced,
            });
        }
        if accepted == witnesses.len() {
            return Ok(CommandOutput {
                seq_no: entry.seq_no,
                response_data: response.response_data,
                commit_path: CommitPath::WitnessQuorum,
            });
        }

        slog::info!(
            logger,
            "{} of {} witnesses recorded. Falling back to sync.",
            accepted,
            witnesses.len()
        );
        self.leader
            .send_to_leader(&self.pool, &SyncRequest::new(Some(entry.clone())))
            .await
            .map_err(classify)?;

        Ok(CommandOutput {
            seq_no: entry.seq_no,
            response_data: response.response_data,
            commit_path: CommitPath::ExplicitSync,
        })
    }

    async fn try_leader_only(&self, entry: &LogEntry) -> Result<CommandOutput, AttemptFailure> {
        let response = self
            .leader
            .send_to_leader(&self.pool, &ClientRequest::new(entry.clone()))
            .await
            .map_err(classify)?;

        Ok(CommandOutput {
            seq_no: entry.seq_no,
            response_data: response.response_data,
            commit_path: CommitPath::LeaderOnly,
        })
    }
}

fn classify(e: SessionError) -> AttemptFailure {
    match e {
        SessionError::MalformedResponse(_) | SessionError::SessionClosed => AttemptFailure::Fatal(e),
        _ => AttemptFailure::Retryable(e),
    }
}
