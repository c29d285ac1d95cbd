//! Client side of the protocol: leader discovery, the witness fast path, and retries.
mod client;
mod connection_pool;
mod error;
mod identity;
mod leader_locator;
mod options;
mod rpc;
mod session;
#[cfg(test)]
pub(crate) mod test_utils;
mod witness;
mod wiring;

pub use client::CurpClient;
pub use error::SessionError;
pub use options::RetryPolicy;
pub use options::SessionOptions;
pub use options::WitnessSelection;
pub use session::CommandOutput;
pub use session::CommitPath;
pub use session::Session;
pub use wiring::try_create_session;
pub use wiring::SessionConfig;
