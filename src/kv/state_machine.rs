use crate::kv::command::{KvCommand, KvResult};
use crate::replica::{StateMachine, StateMachineOutput};
use bytes::Bytes;
use std::collections::HashMap;

/// KvStateMachine is an in-memory string map plus a single counter.
pub struct KvStateMachine {
    logger: slog::Logger,
    map: HashMap<String, String>,
    counter: u64,
}

impl KvStateMachine {
    pub fn new(logger: slog::Logger) -> Self {
        KvStateMachine {
            logger,
            map: HashMap::new(),
            counter: 0,
        }
    }

    fn respond(&self, result: KvResult) -> StateMachineOutput {
        match result.encode() {
            Ok(data) => StateMachineOutput::Data(data),
            Err(e) => {
                slog::error!(self.logger, "Failed to encode {:?}: {:?}", result, e);
                StateMachineOutput::NoData
            }
        }
    }
}

impl StateMachine for KvStateMachine {
    fn apply_command(&mut self, command: Bytes) -> StateMachineOutput {
        let command = match KvCommand::decode(command) {
            Some(command) => command,
            None => {
                slog::warn!(self.logger, "Ignoring command that isn't a KV command");
                return StateMachineOutput::NoData;
            }
        };

        match command {
            KvCommand::Get { key } => {
                let value = self.map.get(&key).cloned().unwrap_or_default();
                self.respond(KvResult { value, counter: 0 })
            }
            KvCommand::Set { key, value } => {
                self.map.insert(key, value);
                StateMachineOutput::NoData
            }
            KvCommand::Inc => {
                self.counter += 1;
                self.respond(KvResult {
                    value: String::new(),
                    counter: self.counter,
                })
            }
        }
    }
}
