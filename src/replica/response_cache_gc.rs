use crate::replica::response_cache::ResponseCache;
use crate::replica::time::{Clock, RealClock};
use crate::shutdown::{self, ShutdownHandle, ShutdownSignal};
use rand::Rng;
use std::sync::{Arc, Weak};
use tokio::time::Duration;

/// Keeps the GC task alive. Dropping it stops the task.
pub(crate) struct ResponseCacheGcHandle {
    _shutdown: ShutdownHandle,
}

struct ResponseCacheGcTask<C: Clock> {
    logger: slog::Logger,
    cache: Weak<ResponseCache<C>>,
    interval: Duration,
    clock: C,
    shutdown: ShutdownSignal,
}

impl ResponseCacheGcHandle {
    pub(crate) fn spawn_gc_task(logger: slog::Logger, cache: &Arc<ResponseCache>, interval: Duration) -> Self {
        let (task, handle) = ResponseCacheGcTask::new(logger, cache, interval, RealClock);
        tokio::task::spawn(task.run());

        handle
    }
}

impl<C: Clock> ResponseCacheGcTask<C> {
    fn new(
        logger: slog::Logger,
        cache: &Arc<ResponseCache<C>>,
        interval: Duration,
        clock: C,
    ) -> (Self, ResponseCacheGcHandle) {
        let (handle, signal) = shutdown::shutdown_signal();

        let task = ResponseCacheGcTask {
            logger,
            cache: Arc::downgrade(cache),
            interval,
            clock,
            shutdown: signal,
        };

        (task, ResponseCacheGcHandle { _shutdown: handle })
    }

    async fn run(mut self) {
        loop {
            let delay = self.next_delay();
            tokio::select! {
                _ = self.clock.sleep(delay) => {}
                _ = &mut self.shutdown => {
                    slog::debug!(self.logger, "Response cache GC stopped");
                    return;
                }
            }

            let cache = match self.cache.upgrade() {
                Some(cache) => cache,
                None => return,
            };
            let evicted = cache.evict_expired();
            if evicted > 0 {
                slog::info!(self.logger, "Evicted {} cached responses. {} remain.", evicted, cache.len());
            }
        }
    }

    /// Somewhere in `[interval, 2 * interval]`, so replicas started together don't sweep in lockstep.
    fn next_delay(&self) -> Duration {
        rand::thread_rng().gen_range(self.interval..=self.interval * 2)
    }
}
