//! Deferred auto-completion jobs
//!
//! Every order entering OUT_FOR_DELIVERY gets a completion job keyed by its
//! order id: sleep a bounded random delay, then re-enter the transition
//! logic. A job is cancelled when the order leaves the eligible state early
//! (manual completion or cancellation) and interrupted by process shutdown;
//! neither case is an error.
//!
//! Jobs run detached from the triggering request and carry none of its
//! context — the task passed to [`CompletionScheduler::schedule`] owns its
//! own store/gateway handles.

use dashmap::DashMap;
use futures::FutureExt;
use rand::Rng;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A scheduled job. The generation stamp distinguishes it from a newer job
/// for the same order id, so a fired job never removes its replacement.
struct PendingJob {
    generation: u64,
    token: CancellationToken,
}

/// Scheduler for per-order deferred completion jobs.
pub struct CompletionScheduler {
    pending: Arc<DashMap<String, PendingJob>>,
    generations: AtomicU64,
    delay_min: Duration,
    delay_max: Duration,
    shutdown: CancellationToken,
}

impl CompletionScheduler {
    pub fn new(delay_min: Duration, delay_max: Duration, shutdown: CancellationToken) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            generations: AtomicU64::new(0),
            delay_min,
            delay_max,
            shutdown,
        }
    }

    /// Uniform random delay within the configured window.
    fn pick_delay(&self) -> Duration {
        if self.delay_max <= self.delay_min {
            return self.delay_min;
        }
        let span = (self.delay_max - self.delay_min).as_millis() as u64;
        let offset = rand::thread_rng().gen_range(0..=span);
        self.delay_min + Duration::from_millis(offset)
    }

    /// Schedule (or reschedule) the completion job for an order.
    ///
    /// Any previous job for the same order is cancelled first. `task` runs
    /// once the delay elapses, unless the job is cancelled or the process
    /// shuts down.
    pub fn schedule<F>(&self, order_id: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        if let Some(previous) = self.pending.insert(
            order_id.to_string(),
            PendingJob {
                generation,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
        }

        let delay = self.pick_delay();
        let pending = Arc::clone(&self.pending);
        let shutdown = self.shutdown.clone();
        let order_id = order_id.to_string();

        tracing::debug!(order_id = %order_id, delay_ms = delay.as_millis() as u64, "Auto-completion job scheduled");

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if AssertUnwindSafe(task).catch_unwind().await.is_err() {
                        tracing::error!(order_id = %order_id, "Auto-completion task panicked");
                    }
                }
                _ = token.cancelled() => {
                    tracing::debug!(order_id = %order_id, "Auto-completion job cancelled");
                }
                _ = shutdown.cancelled() => {
                    tracing::info!(order_id = %order_id, "Auto-completion job interrupted by shutdown");
                }
            }
            // Drop the registry entry unless a newer job replaced this one.
            pending.remove_if(&order_id, |_, job| job.generation == generation);
        });
    }

    /// Cancel the pending job for an order, if any.
    pub fn cancel(&self, order_id: &str) {
        if let Some((_, job)) = self.pending.remove(order_id) {
            job.token.cancel();
        }
    }

    /// Whether a job is currently pending for the order.
    pub fn is_scheduled(&self, order_id: &str) -> bool {
        self.pending.contains_key(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn scheduler(min_ms: u64, max_ms: u64) -> (CompletionScheduler, CancellationToken) {
        let shutdown = CancellationToken::new();
        let scheduler = CompletionScheduler::new(
            Duration::from_millis(min_ms),
            Duration::from_millis(max_ms),
            shutdown.clone(),
        );
        (scheduler, shutdown)
    }

    #[tokio::test]
    async fn test_job_fires_after_delay() {
        let (scheduler, _shutdown) = scheduler(10, 20);
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.schedule("order:a", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(scheduler.is_scheduled("order:a"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_scheduled("order:a"));
    }

    #[tokio::test]
    async fn test_cancel_prevents_firing() {
        let (scheduler, _shutdown) = scheduler(30, 40);
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.schedule("order:a", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel("order:a");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!scheduler.is_scheduled("order:a"));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_pending_jobs() {
        let (scheduler, shutdown) = scheduler(30, 40);
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.schedule("order:a", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        shutdown.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reschedule_replaces_previous_job() {
        let (scheduler, _shutdown) = scheduler(20, 30);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first);
        scheduler.schedule("order:a", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&second);
        scheduler.schedule("order:a", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0, "replaced job must not fire");
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_scheduled("order:a"));
    }

    #[tokio::test]
    async fn test_cancel_unknown_order_is_noop() {
        let (scheduler, _shutdown) = scheduler(10, 20);
        scheduler.cancel("order:never-scheduled");
        assert!(!scheduler.is_scheduled("order:never-scheduled"));
    }

    #[test]
    fn test_pick_delay_within_window() {
        let (scheduler, _shutdown) = scheduler(30, 45);
        for _ in 0..100 {
            let delay = scheduler.pick_delay();
            assert!(delay >= Duration::from_millis(30));
            assert!(delay <= Duration::from_millis(45));
        }
    }

    #[test]
    fn test_pick_delay_degenerate_window() {
        let (scheduler, _shutdown) = scheduler(30, 30);
        assert_eq!(scheduler.pick_delay(), Duration::from_millis(30));
    }
}
