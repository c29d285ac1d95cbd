use std::convert::TryFrom;
use tokio::time::Duration;

/// RetryPolicy bounds how many times the fast-path protocol is restarted for one command.
#[derive(Copy, Clone, Debug)]
pub struct RetryPolicy {
    /// `None` retries until the deadline (or forever, if there's no deadline either).
    pub max_attempts: Option<u32>,
    /// Upper bound on the whole call, across every attempt.
    pub deadline: Option<Duration>,
    /// Pause between two attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn bounded(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: Some(max_attempts),
            ..Default::default()
        }
    }

    pub fn unbounded() -> Self {
        RetryPolicy {
            max_attempts: None,
            ..Default::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: Some(10),
            deadline: None,
            backoff: Duration::from_millis(10),
        }
    }
}

/// WitnessSelection decides which members a command is recorded at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WitnessSelection {
    /// Every member except the guessed leader, which already gets the command directly.
    ExcludeLeader,
    AllMembers,
}

impl WitnessSelection {
    pub(crate) fn witnesses(&self, num_members: usize, leader_guess: usize) -> Vec<usize> {
        match self {
            WitnessSelection::ExcludeLeader => (0..num_members).filter(|i| *i != leader_guess).collect(),
            WitnessSelection::AllMembers => (0..num_members).collect(),
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionOptions {
    pub leader_backoff: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
    pub witness_selection: Option<WitnessSelection>,
    /// Only tests should set this.
    pub first_seq_no: Option<u64>,
}

pub(crate) struct SessionOptionsValidated {
    pub leader_backoff: Duration,
    pub retry_policy: RetryPolicy,
    pub witness_selection: WitnessSelection,
    pub first_seq_no: u64,
}

impl SessionOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.leader_backoff == Duration::from_millis(0) {
            return Err("Leader backoff must be non-zero, or an election would be polled in a hot loop");
        }
        if self.retry_policy.max_attempts == Some(0) {
            return Err("Retry policy must allow at least one attempt");
        }
        if self.retry_policy.deadline == Some(Duration::from_millis(0)) {
            return Err("Retry deadline must be non-zero");
        }
        if self.retry_policy.backoff == Duration::from_millis(0) {
            return Err("Retry backoff must be non-zero");
        }

        Ok(())
    }
}

impl TryFrom<SessionOptions> for SessionOptionsValidated {
    type Error = &'static str;

    fn try_from(options: SessionOptions) -> Result<Self, Self::Error> {
        let values = SessionOptionsValidated {
            leader_backoff: options.leader_backoff.unwrap_or(Duration::from_millis(100)),
            retry_policy: options.retry_policy.unwrap_or_default(),
            witness_selection: options.witness_selection.unwrap_or(WitnessSelection::ExcludeLeader),
            first_seq_no: options.first_seq_no.unwrap_or(0),
        };

        values.validate()?;
        Ok(values)
    }
}
