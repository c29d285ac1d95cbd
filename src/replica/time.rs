use tokio::time::{Duration, Instant};

#[cfg(test)]
use tokio::sync::watch;

/// Time source for cache ageing and the GC timer.
#[async_trait::async_trait]
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    async fn sleep(&mut self, duration: Duration);
}

#[derive(Copy, Clone)]
pub struct RealClock;

#[async_trait::async_trait]
impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A clock that only moves when the returned controller advances it.
#[cfg(test)]
pub(crate) fn mocked_clock() -> (MockClock, MockClockController) {
    let (tx, rx) = watch::channel(Duration::from_millis(0));
    let clock = MockClock {
        base: Instant::now(),
        elapsed: rx,
    };

    (clock, MockClockController { elapsed: tx })
}

#[cfg(test)]
#[derive(Clone)]
pub(crate) struct MockClock {
    base: Instant,
    elapsed: watch::Receiver<Duration>,
}

#[cfg(test)]
#[async_trait::async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + *self.elapsed.borrow()
    }

    async fn sleep(&mut self, duration: Duration) {
        let wake_at = *self.elapsed.borrow() + duration;
        while *self.elapsed.borrow() < wake_at {
            if self.elapsed.changed().await.is_err() {
                // Nobody can advance time anymore.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
pub(crate) struct MockClockController {
    elapsed: watch::Sender<Duration>,
}

#[cfg(test)]
impl MockClockController {
    pub(crate) fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }

    /// Sleepers wake at or after their deadline, so step in increments finer than what the test
    /// measures.
    pub(crate) fn advance(&mut self, step: Duration) {
        let elapsed = self.elapsed() + step;
        self.elapsed.send_replace(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleeper_wakes_once_its_duration_has_passed() {
        let (mut clock, mut controller) = mocked_clock();
        let sleeper = tokio::spawn(async move {
            clock.sleep(Duration::from_secs(2)).await;
        });
        // Let the sleeper take its starting point.
        tokio::time::sleep(Duration::from_millis(20)).await;

        controller.advance(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!sleeper.is_finished());

        controller.advance(Duration::from_secs(1));
        tokio::time::timeout(Duration::from_secs(1), sleeper)
            .await
            .expect("sleeper should wake")
            .unwrap();
        assert_eq!(controller.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn now_follows_the_controller() {
        let (clock, mut controller) = mocked_clock();
        let before = clock.now();

        controller.advance(Duration::from_millis(750));

        assert_eq!(clock.now() - before, Duration::from_millis(750));
    }
}
