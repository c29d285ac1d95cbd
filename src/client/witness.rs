use crate::client::connection_pool::ConnectionPool;
use crate::messages::{LogEntry, RecordRequest, Term};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Records `entry` at one witness. Every failure mode (no connection, transport error, explicit
/// rejection) reads as `false`.
///
/// A rejecting witness reports its term; `known_term` keeps the highest one seen so the next
/// record carries it.
pub(crate) async fn record_at(
    logger: &slog::Logger,
    pool: &ConnectionPool,
    index: usize,
    entry: LogEntry,
    known_term: &AtomicU64,
) -> bool {
    let request = RecordRequest::new(entry, Term::new(known_term.load(Ordering::Acquire)));
    match pool.call(index, &request).await {
        Ok(response) if response.success => true,
        Ok(response) => {
            known_term.fetch_max(response.term.as_u64(), Ordering::AcqRel);
            slog::debug!(logger, "Witness {} rejected record at term {:?}", index, response.term);
            false
        }
        Err(e) => {
            slog::debug!(logger, "Witness {} unreachable: {}", index, e);
            false
        }
    }
}

/// Records `entry` at every witness in parallel, one task per witness, and returns how many
/// accepted. Waits for every witness to answer.
pub(crate) async fn record_at_witnesses(
    logger: &slog::Logger,
    pool: &Arc<ConnectionPool>,
    witnesses: &[usize],
    entry: &LogEntry,
    known_term: &Arc<AtomicU64>,
) -> usize {
    let (tx, mut rx) = mpsc::channel(witnesses.len().max(1));

    for &index in witnesses {
        let tx = tx.clone();
        let logger = logger.clone();
        let pool = pool.clone();
        let entry = entry.clone();
        let known_term = known_term.clone();
        tokio::spawn(async move {
            let recorded = record_at(&logger, &pool, index, entry, &known_term).await;
            let _ = tx.send(recorded).await;
        });
    }
    drop(tx);

    // A task that died without reporting counts as a rejection.
    let mut accepted = 0;
    while let Some(recorded) = rx.recv().await {
        if recorded {
            accepted += 1;
        }
    }

    accepted
}
