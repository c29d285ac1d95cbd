use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct ReplicaOptions {
    pub response_cache_gc_interval: Option<Duration>,
    pub response_cache_retention: Option<Duration>,
    /// Bounds each witness GC call to another member.
    pub peer_rpc_timeout: Option<Duration>,
}

pub(crate) struct ReplicaOptionsValidated {
    pub response_cache_gc_interval: Duration,
    pub response_cache_retention: Duration,
    pub peer_rpc_timeout: Duration,
}

impl ReplicaOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.response_cache_gc_interval == Duration::from_millis(0) {
            return Err("Response cache GC interval must be non-zero");
        }
        if self.response_cache_retention == Duration::from_millis(0) {
            return Err("Response cache retention must be non-zero, or retransmissions would be re-executed");
        }
        if self.peer_rpc_timeout == Duration::from_millis(0) {
            return Err("Peer RPC timeout must be non-zero");
        }

        Ok(())
    }
}

impl TryFrom<ReplicaOptions> for ReplicaOptionsValidated {
    type Error = &'static str;

    fn try_from(options: ReplicaOptions) -> Result<Self, Self::Error> {
        let values = ReplicaOptionsValidated {
            response_cache_gc_interval: options.response_cache_gc_interval.unwrap_or(Duration::from_secs(1)),
            response_cache_retention: options.response_cache_retention.unwrap_or(Duration::from_secs(30)),
            peer_rpc_timeout: options.peer_rpc_timeout.unwrap_or(Duration::from_secs(1)),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ReplicaOptionsValidated::try_from(ReplicaOptions::default()).unwrap();
        assert_eq!(options.response_cache_gc_interval, Duration::from_secs(1));
        assert_eq!(options.response_cache_retention, Duration::from_secs(30));
        assert_eq!(options.peer_rpc_timeout, Duration::from_secs(1));
    }

    #[test]
    fn zero_durations_rejected() {
        let zero_retention = ReplicaOptions {
            response_cache_retention: Some(Duration::from_millis(0)),
            ..Default::default()
        };
        let zero_interval = ReplicaOptions {
            response_cache_gc_interval: Some(Duration::from_millis(0)),
            ..Default::default()
        };

        let zero_peer_timeout = ReplicaOptions {
            peer_rpc_timeout: Some(Duration::from_millis(0)),
            ..Default::default()
        };

        assert!(ReplicaOptionsValidated::try_from(zero_retention).is_err());
        assert!(ReplicaOptionsValidated::try_from(zero_interval).is_err());
        assert!(ReplicaOptionsValidated::try_from(zero_peer_timeout).is_err());
    }
}
