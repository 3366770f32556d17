//! Per-order row locks
//!
//! Serializes concurrent status mutations on the same order: the order row
//! is the only resource requiring explicit locking (line items are owned by
//! value and never locked independently). Acquisition is bounded; a loser
//! that cannot acquire the lock in time observes a conflict instead of
//! overwriting.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock registry size warning threshold
const LOCK_WARN_THRESHOLD: usize = 10_000;

/// Keyed async lock registry.
#[derive(Debug, Default)]
pub struct OrderLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for an order, waiting at most `timeout`.
    ///
    /// Returns `None` when the timeout elapses.
    pub async fn acquire(
        &self,
        order_id: &str,
        timeout: Duration,
    ) -> Option<OwnedMutexGuard<()>> {
        let lock = self
            .locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        if self.locks.len() > LOCK_WARN_THRESHOLD {
            tracing::warn!(
                registry_size = self.locks.len(),
                "Order lock registry exceeds threshold, possible lock leak"
            );
        }

        tokio::time::timeout(timeout, lock.lock_owned()).await.ok()
    }

    /// Drop the registry entry once an order is deleted. Existing guards
    /// stay valid through their own Arc.
    pub fn remove(&self, order_id: &str) {
        self.locks.remove(order_id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let locks = OrderLocks::new();
        let guard = locks.acquire("order:a", Duration::from_millis(100)).await;
        assert!(guard.is_some());
        drop(guard);

        // Re-acquire after release succeeds immediately.
        let guard = locks.acquire("order:a", Duration::from_millis(100)).await;
        assert!(guard.is_some());
    }

    #[tokio::test]
    async fn test_contended_acquire_times_out() {
        let locks = Arc::new(OrderLocks::new());
        let _held = locks
            .acquire("order:a", Duration::from_millis(100))
            .await
            .unwrap();

        let second = locks.acquire("order:a", Duration::from_millis(50)).await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_independent_orders_do_not_contend() {
        let locks = OrderLocks::new();
        let _a = locks
            .acquire("order:a", Duration::from_millis(50))
            .await
            .unwrap();
        let b = locks.acquire("order:b", Duration::from_millis(50)).await;
        assert!(b.is_some());
    }

    #[tokio::test]
    async fn test_waiter_proceeds_when_holder_releases() {
        let locks = Arc::new(OrderLocks::new());
        let held = locks
            .acquire("order:a", Duration::from_millis(100))
            .await
            .unwrap();

        let locks2 = Arc::clone(&locks);
        let waiter = tokio::spawn(async move {
            locks2
                .acquire("order:a", Duration::from_millis(500))
                .await
                .is_some()
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_drops_entry() {
        let locks = OrderLocks::new();
        drop(locks.acquire("order:a", Duration::from_millis(50)).await);
        assert_eq!(locks.len(), 1);
        locks.remove("order:a");
        assert_eq!(locks.len(), 0);
    }
}
