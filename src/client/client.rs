use crate::client::error::SessionError;
use crate::client::session::{CommandOutput, Session};
use crate::client::wiring::{try_create_session, SessionConfig};
use crate::messages::CommutativityKey;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::Mutex;

/// CurpClient opens its session on first use and keeps it until `destroy`.
pub struct CurpClient {
    config: SessionConfig,
    session: Mutex<Option<Arc<Session>>>,
}

impl CurpClient {
    pub fn new(config: SessionConfig) -> Self {
        CurpClient {
            config,
            session: Mutex::new(None),
        }
    }

    pub async fn session(&self) -> Result<Arc<Session>, SessionError> {
        let mut session = self.session.lock().await;
        if let Some(s) = session.as_ref() {
            return Ok(s.clone());
        }

        let s = Arc::new(try_create_session(self.config.clone()).await?);
        *session = Some(s.clone());
        Ok(s)
    }

    pub async fn send(&self, payload: Bytes, keys: Vec<CommutativityKey>) -> Result<CommandOutput, SessionError> {
        self.session().await?.send_fast(payload, keys).await
    }

    /// Closes the current session, if any. The next call opens a fresh one with a new client ID.
    pub async fn destroy(&self) {
        let session = self.session.lock().await.take();
        if let Some(s) = session {
            s.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_utils::{addresses, test_logger, FakeCluster};
    use crate::SessionOptions;

    #[tokio::test]
    async fn session_is_opened_lazily_and_reused() {
        let members = addresses(3);
        let cluster = FakeCluster::with_leader(&members, 0);
        let client = CurpClient::new(SessionConfig {
            members: members.clone(),
            connector: Arc::new(cluster.clone()),
            info_logger: test_logger(),
            options: SessionOptions::default(),
        });
        assert_eq!(cluster.calls(&members[0]).connects, 0);

        client.send(Bytes::from_static(b"a"), vec![]).await.unwrap();
        client.send(Bytes::from_static(b"b"), vec![]).await.unwrap();
        assert_eq!(cluster.calls(&members[0]).client_id, 1);

        let old_session = client.session().await.unwrap();
        client.destroy().await;
        assert!(matches!(
            old_session.send_fast(Bytes::from_static(b"c"), vec![]).await,
            Err(SessionError::SessionClosed)
        ));

        client.send(Bytes::from_static(b"d"), vec![]).await.unwrap();
        assert_eq!(cluster.calls(&members[0]).client_id, 2);
    }
}
