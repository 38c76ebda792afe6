use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A repeating task with an explicit cancellation token.
///
/// The first tick fires one `period` after spawning. The token is checked
/// before every tick body runs, so nothing fires once `cancel` has returned.
pub struct Ticker {
    name: &'static str,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut body: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if cancelled.is_cancelled() {
                            break;
                        }
                        if body().await.is_break() {
                            break;
                        }
                    }
                }
            }

            debug!("{} task stopped", name);
        });

        info!("{} task started ({}ms period)", name, period.as_millis());

        Self {
            name,
            token,
            handle: Some(handle),
        }
    }

    /// Cancel the task.
    ///
    /// Returns the join handle on the first call so the caller can wait for
    /// an in-progress tick; later calls are no-ops and return `None`.
    pub fn cancel(&mut self) -> Option<JoinHandle<()>> {
        let handle = self.handle.take();
        if handle.is_some() {
            self.token.cancel();
            debug!("{} task cancelled", self.name);
        }
        handle
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let mut ticker = Ticker::spawn("test", Duration::from_millis(1000), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        });

        time::sleep(Duration::from_millis(999)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(2002)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        if let Some(handle) = ticker.cancel() {
            handle.await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_once() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let mut ticker = Ticker::spawn("test", Duration::from_millis(100), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        });

        time::sleep(Duration::from_millis(250)).await;
        let first = ticker.cancel();
        assert!(first.is_some());
        first.unwrap().await.unwrap();
        assert!(ticker.cancel().is_none());
        assert!(!ticker.is_running());

        let seen = ticks.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_ends_task() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let mut ticker = Ticker::spawn("test", Duration::from_millis(100), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Break(())
            }
        });

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        ticker.cancel().unwrap().await.unwrap();
    }
}
