use chrono::Utc;
use curp::{
    GrpcConnector, KvClient, KvStateMachine, MemberAddress, ReplicaConfig, ReplicaOptions, SessionConfig,
    SessionOptions, Term,
};
use slog::Drain;
use std::error::Error;
use std::sync::Arc;
use tokio::time::Duration;

const NUM_MEMBERS: u16 = 3;
const PORT_BASE: u16 = 7000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let logger = create_root_logger_for_stdout();
    let members: Vec<MemberAddress> = (0..NUM_MEMBERS)
        .map(|i| MemberAddress::new(format!("127.0.0.1:{}", PORT_BASE + i)))
        .collect();
    let leader = members[0].clone();

    let mut replicas = Vec::with_capacity(members.len());
    for member in members.iter() {
        let replica = curp::try_create_replica(ReplicaConfig {
            my_address: member.clone(),
            members: members.clone(),
            initial_leader: Some(leader.clone()),
            initial_term: Term::new(1),
            state_machine: KvStateMachine::new(logger.new(slog::o!("StateMachine" => member.to_string()))),
            info_logger: logger.clone(),
            options: ReplicaOptions::default(),
        })?;
        replicas.push(replica);
    }

    // Give the servers a moment to bind.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let client_logger = logger.new(slog::o!("Client" => "demo"));
    let kv = KvClient::new(SessionConfig {
        members,
        connector: Arc::new(GrpcConnector::new(client_logger.clone(), Duration::from_secs(1))),
        info_logger: client_logger.clone(),
        options: SessionOptions::default(),
    });

    kv.set("greeting", "hello").await?;
    let greeting = kv.get("greeting").await?;
    slog::info!(client_logger, "get(greeting) = {:?}", greeting);

    for _ in 0..3 {
        let counter = kv.inc().await?;
        slog::info!(client_logger, "inc() = {}", counter);
    }

    kv.destroy().await;
    for replica in replicas.iter() {
        slog::info!(
            logger,
            "Replica holds {} cached responses",
            replica.response_cache().len()
        );
    }
    drop(replicas);

    Ok(())
}

fn create_root_logger_for_stdout() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let started_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    slog::Logger::root(drain, slog::o!("Run" => started_at))
}
