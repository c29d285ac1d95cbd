use crate::client::connection_pool::ConnectionPool;
use crate::client::error::SessionError;
use crate::client::identity::ClientIdentity;
use crate::client::leader_locator::LeaderLocator;
use crate::client::options::{SessionOptions, SessionOptionsValidated};
use crate::client::session::Session;
use crate::messages::{ClientIdRequest, MemberAddress};
use crate::transport::Connector;
use std::convert::TryFrom;
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionConfig {
    pub members: Vec<MemberAddress>,
    pub connector: Arc<dyn Connector>,
    pub info_logger: slog::Logger,
    pub options: SessionOptions,
}

/// Connects to the cluster and obtains a client ID. Fails if no member can be reached, or if no
/// member knows of a leader that will hand out an ID.
pub async fn try_create_session(config: SessionConfig) -> Result<Session, SessionError> {
    let options = SessionOptionsValidated::try_from(config.options)
        .map_err(|e| SessionError::IllegalOptions(e.to_string()))?;
    if config.members.is_empty() {
        return Err(SessionError::EmptyCluster);
    }

    let root_logger = config.info_logger;
    let pool = Arc::new(ConnectionPool::new(
        root_logger.new(slog::o!("Component" => "ConnectionPool")),
        config.connector,
        config.members,
    ));

    let reachable = pool.connect_all().await;
    let initial_guess = match reachable.first() {
        Some(index) => *index,
        None => return Err(SessionError::NoActiveServers),
    };

    let leader = LeaderLocator::new(
        root_logger.new(slog::o!("Component" => "LeaderLocator")),
        initial_guess,
        options.leader_backoff,
    );
    let response = leader.send_to_leader(&pool, &ClientIdRequest::new()).await?;
    let identity = ClientIdentity::new(response.client_id, options.first_seq_no);

    let logger = root_logger.new(slog::o!("ClientId" => response.client_id.as_u64()));
    slog::info!(
        logger,
        "Session established. {} of {} members reachable.",
        reachable.len(),
        pool.len()
    );

    Ok(Session::new(logger, pool, leader, identity, options))
}
