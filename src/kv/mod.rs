//! A small key-value store that runs on the CURP replica, used by the demo and end-to-end tests.
mod client;
mod command;
mod state_machine;

pub use client::KvClient;
pub use client::KvError;
pub use command::KvCommand;
pub use command::KvResult;
pub use state_machine::KvStateMachine;
