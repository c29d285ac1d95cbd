mod options;
mod replica;
mod response_cache;
mod response_cache_gc;
mod state_machine;
mod time;
mod witness;
mod witness_gc;
mod wiring;

pub(crate) use replica::Replica;
pub(crate) use replica::ReplicaInit;
pub use response_cache::CachedResponse;
pub use response_cache::ResponseCache;
pub use options::ReplicaOptions;
pub use state_machine::StateMachine;
pub use state_machine::StateMachineOutput;
pub use wiring::try_create_replica;
pub use wiring::ReplicaConfig;
pub use wiring::ReplicaCreationError;
pub use wiring::ReplicaHandle;
