use bytes::Bytes;
use curp::{
    ClientId, CommitPath, Connection, Connector, GrpcConnector, KvClient, KvCommand, KvStateMachine, LogEntry,
    MemberAddress, RecordRequest, RecoveryDataRequest, ReplicaConfig, ReplicaCreationError, ReplicaHandle,
    ReplicaOptions, SeqNo, SessionConfig, SessionOptions, Term, UnfreezeRequest,
};
use slog::Drain;
use std::error::Error;
use std::sync::Arc;
use tokio::time::Duration;

const RPC_TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn set_then_get() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7100, 3, 0, ReplicaOptions::default()).await?;
    let kv = kv_client(&members);

    kv.set("fruit", "mango").await?;
    kv.set("veg", "leek").await?;

    assert_eq!(kv.get("fruit").await?, "mango");
    assert_eq!(kv.get("veg").await?, "leek");
    assert_eq!(kv.get("never-set").await?, "");

    Ok(())
}

#[tokio::test]
async fn retransmitted_set_is_not_applied_twice() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7110, 3, 0, ReplicaOptions::default()).await?;
    let kv = kv_client(&members);

    kv.set_with_seq_no("k", "first", SeqNo::new(100)).await?;
    kv.set("k", "second").await?;
    // Same seq no as the first write: the cluster answers from its cache instead of re-applying.
    kv.set_with_seq_no("k", "first", SeqNo::new(100)).await?;

    assert_eq!(kv.get("k").await?, "second");

    Ok(())
}

#[tokio::test]
async fn same_seq_no_from_different_clients_applies_both() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7120, 3, 0, ReplicaOptions::default()).await?;
    let kv_a = kv_client(&members);
    let kv_b = kv_client(&members);

    let a = kv_a.inc_with_seq_no(SeqNo::new(5)).await?;
    let b = kv_b.inc_with_seq_no(SeqNo::new(5)).await?;

    assert_eq!(a, 1);
    assert_eq!(b, 2);

    Ok(())
}

#[tokio::test]
async fn same_seq_no_from_one_client_applies_once() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7130, 3, 0, ReplicaOptions::default()).await?;
    let kv = kv_client(&members);

    assert_eq!(kv.inc_with_seq_no(SeqNo::new(5)).await?, 1);
    assert_eq!(kv.inc_with_seq_no(SeqNo::new(5)).await?, 1);
    assert_eq!(kv.inc().await?, 2);

    Ok(())
}

#[tokio::test]
async fn client_follows_redirect_to_leader() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7140, 3, 2, ReplicaOptions::default()).await?;
    // First reachable member is the initial guess, and it isn't the leader.
    let kv = kv_client(&members);

    kv.set("k", "v").await?;
    assert_eq!(kv.get("k").await?, "v");

    Ok(())
}

#[tokio::test]
async fn client_follows_leadership_change() -> Result<(), Box<dyn Error>> {
    let (members, replicas) = boot_cluster(7150, 3, 0, ReplicaOptions::default()).await?;
    let kv = kv_client(&members);
    kv.set("before", "1").await?;

    for replica in replicas.iter() {
        replica.change_leader(Some(members[1].clone()), Term::new(2)).await?;
    }

    // Only routing is exercised here. The reference replica keeps no log, so the new leader
    // doesn't inherit "before"; this says nothing about durability across the change.
    // The session still targets the old leader and still records at term 0; both get corrected.
    kv.set("after", "2").await?;
    assert_eq!(kv.get("after").await?, "2");

    Ok(())
}

#[tokio::test]
async fn cached_responses_are_collected_after_retention() -> Result<(), Box<dyn Error>> {
    let options = ReplicaOptions {
        response_cache_gc_interval: Some(Duration::from_millis(100)),
        response_cache_retention: Some(Duration::from_millis(300)),
        ..Default::default()
    };
    let (members, replicas) = boot_cluster(7160, 3, 0, options).await?;
    let kv = kv_client(&members);

    kv.inc().await?;
    kv.inc().await?;
    assert_eq!(replicas[0].response_cache().len(), 2);

    sleep(Duration::from_millis(1500)).await;
    assert!(replicas[0].response_cache().is_empty());

    // A retransmission after collection is executed again.
    assert_eq!(kv.inc_with_seq_no(SeqNo::new(0)).await?, 3);

    Ok(())
}

#[tokio::test]
async fn witness_hands_over_recorded_commands_and_unfreezes() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7170, 3, 0, ReplicaOptions::default()).await?;
    let connector = GrpcConnector::new(create_root_logger_for_stdout("recovery".into()), RPC_TIMEOUT);
    let mut witness = connector.connect(&members[1]).await?;

    // Recorded without ever reaching the leader, so nothing garbage collects it.
    let command = KvCommand::Set {
        key: "k".into(),
        value: "v".into(),
    };
    let orphan = LogEntry::command(command.encode()?, command.keys(), ClientId::new(500), SeqNo::new(0));
    assert!(witness.record(RecordRequest::new(orphan.clone(), Term::new(0))).await?.success);

    let recovered = witness.recovery_data(RecoveryDataRequest::new()).await?;
    assert_eq!(recovered.entries, vec![orphan]);

    let later = LogEntry::command(Bytes::from_static(b"later"), vec![], ClientId::new(999), SeqNo::new(0));
    let frozen = witness.record(RecordRequest::new(later.clone(), Term::new(0))).await?;
    assert!(!frozen.success);

    witness.unfreeze(UnfreezeRequest::new()).await?;
    let unfrozen = witness.record(RecordRequest::new(later, Term::new(0))).await?;
    assert!(unfrozen.success);

    Ok(())
}

#[tokio::test]
async fn same_key_commands_keep_committing_at_the_witnesses() -> Result<(), Box<dyn Error>> {
    let (members, _replicas) = boot_cluster(7180, 3, 0, ReplicaOptions::default()).await?;
    let info_logger = create_root_logger_for_stdout("client".into());
    let session = curp::try_create_session(SessionConfig {
        members: members.clone(),
        connector: Arc::new(GrpcConnector::new(info_logger.clone(), RPC_TIMEOUT)),
        info_logger,
        options: SessionOptions::default(),
    })
    .await?;

    let mut commit_paths = Vec::new();
    for i in 0..4 {
        let command = KvCommand::Set {
            key: "hot".into(),
            value: i.to_string(),
        };
        let output = session.send_fast(command.encode()?, command.keys()).await?;
        commit_paths.push(output.commit_path);
        // Leaves room for the leader to commit and collect the witnesses.
        sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(commit_paths[2], CommitPath::WitnessQuorum);
    assert_eq!(commit_paths[3], CommitPath::WitnessQuorum);

    for i in 0..20 {
        let command = KvCommand::Set {
            key: format!("key-{}", i),
            value: "v".into(),
        };
        session.send_fast(command.encode()?, command.keys()).await?;
    }
    sleep(Duration::from_millis(500)).await;

    let connector = GrpcConnector::new(create_root_logger_for_stdout("recovery".into()), RPC_TIMEOUT);
    for witness_address in members[1..].iter() {
        let mut witness = connector.connect(witness_address).await?;
        let held = witness.recovery_data(RecoveryDataRequest::new()).await?;
        assert!(held.entries.is_empty(), "{} still holds {:?}", witness_address, held.entries);
    }

    Ok(())
}

#[tokio::test]
async fn unparseable_address_is_rejected() {
    let address = MemberAddress::new("no-port-here");
    let info_logger = create_root_logger_for_stdout(address.to_string());

    let result = curp::try_create_replica(ReplicaConfig {
        my_address: address.clone(),
        members: vec![address.clone()],
        initial_leader: Some(address),
        initial_term: Term::new(0),
        state_machine: KvStateMachine::new(info_logger.clone()),
        info_logger,
        options: ReplicaOptions::default(),
    });

    match result {
        Err(ReplicaCreationError::InvalidAddress(reported)) => assert_eq!(reported, "no-port-here"),
        Err(e) => panic!("Expected InvalidAddress, got {}", e),
        Ok(_) => panic!("Expected InvalidAddress"),
    }
}

async fn boot_cluster(
    port_base: u16,
    num_members: u16,
    leader_index: usize,
    options: ReplicaOptions,
) -> Result<(Vec<MemberAddress>, Vec<ReplicaHandle>), Box<dyn Error>> {
    let members: Vec<MemberAddress> = (0..num_members)
        .map(|i| MemberAddress::new(format!("127.0.0.1:{}", port_base + i)))
        .collect();
    let leader = members[leader_index].clone();

    let mut replicas = Vec::with_capacity(members.len());
    for member in members.iter() {
        let info_logger = create_root_logger_for_stdout(member.to_string());
        let replica = curp::try_create_replica(ReplicaConfig {
            my_address: member.clone(),
            members: members.clone(),
            initial_leader: Some(leader.clone()),
            initial_term: Term::new(0),
            state_machine: KvStateMachine::new(info_logger.clone()),
            info_logger,
            options: options.clone(),
        })?;
        replicas.push(replica);
    }

    // Servers bind in the background.
    sleep(Duration::from_millis(300)).await;

    Ok((members, replicas))
}

fn kv_client(members: &[MemberAddress]) -> KvClient {
    let info_logger = create_root_logger_for_stdout("client".into());
    KvClient::new(SessionConfig {
        members: members.to_vec(),
        connector: Arc::new(GrpcConnector::new(info_logger.clone(), RPC_TIMEOUT)),
        info_logger,
        options: SessionOptions::default(),
    })
}

fn create_root_logger_for_stdout(member: String) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("Member" => member))
}

async fn sleep(duration: Duration) {
    println!("Sleep {}ms", duration.as_millis());
    tokio::time::sleep(duration).await;
    println!("Awake!");
}
