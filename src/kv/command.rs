use crate::grpc::{proto_kv_command, ProtoKvCommand, ProtoKvGet, ProtoKvInc, ProtoKvResult, ProtoKvSet};
use crate::messages::CommutativityKey;
use bytes::Bytes;
use prost::Message;

/// All `Inc` commands touch the same counter, so they share one key.
const COUNTER_KEY: &[u8] = &[1];

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KvCommand {
    Get { key: String },
    Set { key: String, value: String },
    Inc,
}

impl KvCommand {
    pub fn keys(&self) -> Vec<CommutativityKey> {
        match self {
            KvCommand::Get { key } | KvCommand::Set { key, .. } => {
                vec![CommutativityKey::new(Bytes::copy_from_slice(key.as_bytes()))]
            }
            KvCommand::Inc => vec![CommutativityKey::new(Bytes::from_static(COUNTER_KEY))],
        }
    }

    pub fn encode(&self) -> Result<Bytes, prost::EncodeError> {
        let op = match self.clone() {
            KvCommand::Get { key } => proto_kv_command::Op::Get(ProtoKvGet { key }),
            KvCommand::Set { key, value } => proto_kv_command::Op::Set(ProtoKvSet { key, value }),
            KvCommand::Inc => proto_kv_command::Op::Inc(ProtoKvInc {}),
        };

        encode_message(&ProtoKvCommand { op: Some(op) })
    }

    /// Returns `None` for bytes that aren't a command this crate knows.
    pub fn decode(data: Bytes) -> Option<Self> {
        let proto_command = ProtoKvCommand::decode(data).ok()?;
        match proto_command.op? {
            proto_kv_command::Op::Get(get) => Some(KvCommand::Get { key: get.key }),
            proto_kv_command::Op::Set(set) => Some(KvCommand::Set {
                key: set.key,
                value: set.value,
            }),
            proto_kv_command::Op::Inc(_) => Some(KvCommand::Inc),
        }
    }
}

/// KvResult is what `Get` and `Inc` answer with. `Set` answers with nothing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KvResult {
    pub value: String,
    pub counter: u64,
}

impl KvResult {
    pub(crate) fn encode(&self) -> Result<Bytes, prost::EncodeError> {
        encode_message(&ProtoKvResult {
            value: self.value.clone(),
            counter: self.counter,
        })
    }

    pub(crate) fn decode(data: Bytes) -> Result<Self, prost::DecodeError> {
        let proto_result = ProtoKvResult::decode(data)?;
        Ok(KvResult {
            value: proto_result.value,
            counter: proto_result.counter,
        })
    }
}

fn encode_message<M: Message>(message: &M) -> Result<Bytes, prost::EncodeError> {
    let mut buf = Vec::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;
    Ok(Bytes::from(buf))
}
