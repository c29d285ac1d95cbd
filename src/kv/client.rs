use crate::client::{CommandOutput, CurpClient, SessionConfig, SessionError};
use crate::kv::command::{KvCommand, KvResult};
use crate::messages::SeqNo;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("Session failure: {0}")]
    Session(#[from] SessionError),
    #[error("Failed to encode command: {0}")]
    Encode(#[from] prost::EncodeError),
    #[error("Failed to decode result: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// KvClient issues key-value commands over a lazily opened CURP session.
pub struct KvClient {
    client: CurpClient,
}

impl KvClient {
    pub fn new(config: SessionConfig) -> Self {
        KvClient {
            client: CurpClient::new(config),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.send(Self::set_command(key, value), None).await?;
        Ok(())
    }

    /// Test hook: reusing a seq no must not apply the write twice.
    pub async fn set_with_seq_no(&self, key: &str, value: &str, seq_no: SeqNo) -> Result<(), KvError> {
        self.send(Self::set_command(key, value), Some(seq_no)).await?;
        Ok(())
    }

    /// Returns the value of `key`, or an empty string if it was never set.
    pub async fn get(&self, key: &str) -> Result<String, KvError> {
        let output = self.send(KvCommand::Get { key: key.to_string() }, None).await?;
        Ok(KvResult::decode(output.response_data)?.value)
    }

    /// Increments the counter and returns its new value. Not idempotent across seq nos.
    pub async fn inc(&self) -> Result<u64, KvError> {
        let output = self.send(KvCommand::Inc, None).await?;
        Ok(KvResult::decode(output.response_data)?.counter)
    }

    /// Test hook: a retransmitted `Inc` answers with the counter value of its first execution.
    pub async fn inc_with_seq_no(&self, seq_no: SeqNo) -> Result<u64, KvError> {
        let output = self.send(KvCommand::Inc, Some(seq_no)).await?;
        Ok(KvResult::decode(output.response_data)?.counter)
    }

    pub async fn destroy(&self) {
        self.client.destroy().await;
    }

    fn set_command(key: &str, value: &str) -> KvCommand {
        KvCommand::Set {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    async fn send(&self, command: KvCommand, seq_no: Option<SeqNo>) -> Result<CommandOutput, KvError> {
        let payload = command.encode()?;
        let keys = command.keys();
        let output = match seq_no {
            None => self.client.send(payload, keys).await?,
            Some(seq_no) => {
                self.client
                    .session()
                    .await?
                    .send_fast_with_seq_no(payload, keys, seq_no)
                    .await?
            }
        };

        Ok(output)
    }
}
