//! Bounded non-blocking worker pool.
//!
//! Every processor owns one pool. [`WorkerPool::submit`] never waits: when
//! all workers are busy the task is rejected and the caller drops the event.
//! A panicking task is caught, logged and counted without affecting other
//! tasks or the pool itself.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, TryAcquireError};
use tracing::instrument::WithSubscriber;
use tracing::{debug, error};

use crate::error::PoolError;

/// Bounded executor with non-blocking submission.
///
/// # Example
///
/// ```rust,ignore
/// use innerring_event::WorkerPool;
///
/// let pool = WorkerPool::new(4)?;
/// pool.submit(async { /* handle event */ })?;
/// pool.drain().await;
/// ```
#[derive(Debug)]
pub struct WorkerPool {
    /// Maximum number of concurrently running tasks.
    capacity: usize,

    /// One permit per worker slot.
    permits: Arc<Semaphore>,

    /// Runtime the tasks are spawned on.
    handle: Handle,

    /// Set once the pool stops accepting tasks.
    closed: AtomicBool,

    /// Task counters.
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Returns the largest supported pool size.
    #[must_use]
    pub fn max_size() -> usize {
        Semaphore::MAX_PERMITS.min(u32::MAX as usize)
    }

    /// Creates a pool on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is invalid or no runtime is running.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        let handle = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;
        Self::with_handle(capacity, handle)
    }

    /// Creates a pool spawning tasks on the given runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero or above [`WorkerPool::max_size`].
    pub fn with_handle(capacity: usize, handle: Handle) -> Result<Self, PoolError> {
        let max = Self::max_size();
        if capacity == 0 || capacity > max {
            return Err(PoolError::InvalidSize {
                size: capacity,
                max,
            });
        }

        Ok(Self {
            capacity,
            permits: Arc::new(Semaphore::new(capacity)),
            handle,
            closed: AtomicBool::new(false),
            stats: Arc::new(PoolStats::new()),
        })
    }

    /// Schedules a task without waiting.
    ///
    /// The task inherits the tracing subscriber current at submission.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Saturated`] if every worker is busy and
    /// [`PoolError::Closed`] after [`WorkerPool::close`].
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|e| match e {
                TryAcquireError::NoPermits => PoolError::Saturated {
                    capacity: self.capacity,
                },
                TryAcquireError::Closed => PoolError::Closed,
            })?;

        self.stats.record_submitted();
        let stats = Arc::clone(&self.stats);

        let job = async move {
            match AssertUnwindSafe(task).catch_unwind().await {
                Ok(()) => stats.record_completed(),
                Err(payload) => {
                    stats.record_panicked();
                    error!(
                        panic = panic_message(&*payload),
                        "worker pool task panicked"
                    );
                }
            }
            drop(permit);
        };

        drop(self.handle.spawn(job.with_current_subscriber()));
        Ok(())
    }

    /// Returns the pool capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of free worker slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Returns the number of running tasks.
    #[must_use]
    pub fn running(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Returns true once the pool stopped accepting tasks.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the task counters.
    #[must_use]
    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    /// Stops accepting new tasks. Running tasks are not interrupted.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Closes the pool and waits for running tasks to finish.
    pub async fn drain(&self) {
        self.close();

        let Ok(all) = u32::try_from(self.capacity) else {
            return;
        };
        if let Ok(permits) = self.permits.acquire_many(all).await {
            drop(permits);
        }

        debug!(
            completed = self.stats.completed(),
            panicked = self.stats.panicked(),
            "worker pool drained"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("task panicked")
}

/// Worker pool task counters.
#[derive(Debug, Default)]
pub struct PoolStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
}

impl PoolStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of accepted tasks.
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Returns the number of tasks that ran to completion.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Returns the number of tasks that panicked.
    #[must_use]
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::watch;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_pool_requires_runtime() {
        assert_eq!(WorkerPool::new(1).err(), Some(PoolError::NoRuntime));
    }

    #[tokio::test]
    async fn test_pool_invalid_size() {
        let err = WorkerPool::new(0).err();
        assert!(matches!(err, Some(PoolError::InvalidSize { size: 0, .. })));
    }

    #[tokio::test]
    async fn test_pool_with_handle() {
        let pool = WorkerPool::with_handle(2, Handle::current()).expect("pool");
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.running(), 0);
    }

    #[tokio::test]
    async fn test_pool_runs_task() {
        let pool = WorkerPool::new(2).expect("pool");
        let (tx, rx) = tokio::sync::oneshot::channel();

        assert_ok!(pool.submit(async move {
            let _ = tx.send(42);
        }));

        assert_eq!(rx.await.expect("result"), 42);
        pool.drain().await;
        assert_eq!(pool.stats().completed(), 1);
    }

    #[tokio::test]
    async fn test_pool_saturation_rejects() {
        let pool = WorkerPool::new(1).expect("pool");
        let (release, gate) = watch::channel(false);

        let mut accepted = 0;
        let mut rejected = 0;
        for _ in 0..5 {
            let mut gate = gate.clone();
            let result = pool.submit(async move {
                let _ = gate.wait_for(|open| *open).await;
            });
            match result {
                Ok(()) => accepted += 1,
                Err(PoolError::Saturated { capacity }) => {
                    assert_eq!(capacity, 1);
                    rejected += 1;
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(rejected, 4);
        assert_eq!(pool.running(), 1);

        release.send_replace(true);
        pool.drain().await;
        assert_eq!(pool.stats().completed(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_bounded_concurrency() {
        const CAPACITY: usize = 3;

        let pool = WorkerPool::new(CAPACITY).expect("pool");
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut accepted = 0u64;
        let mut rejected = 0u64;
        for _ in 0..32 {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            let result = pool.submit(async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            });
            if result.is_ok() {
                accepted += 1;
            } else {
                rejected += 1;
            }
        }

        pool.drain().await;

        assert!(rejected >= 1);
        assert!(peak.load(Ordering::SeqCst) <= CAPACITY);
        assert_eq!(pool.stats().completed(), accepted);
    }

    #[tokio::test]
    async fn test_pool_isolates_panics() {
        let pool = WorkerPool::new(1).expect("pool");

        assert_ok!(pool.submit(async {
            panic!("boom");
        }));

        // the slot is released once the panic is caught
        while pool.stats().panicked() == 0 || pool.running() > 0 {
            tokio::task::yield_now().await;
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        assert_ok!(pool.submit(async move {
            let _ = tx.send(());
        }));
        assert_ok!(rx.await);

        pool.drain().await;
        assert_eq!(pool.stats().panicked(), 1);
        assert_eq!(pool.stats().completed(), 1);
    }

    #[tokio::test]
    async fn test_pool_closed_rejects() {
        let pool = WorkerPool::new(1).expect("pool");
        pool.close();

        assert!(pool.is_closed());
        assert_eq!(assert_err!(pool.submit(async {})), PoolError::Closed);
    }

    #[tokio::test]
    async fn test_pool_drain_waits_for_tasks() {
        let pool = WorkerPool::new(2).expect("pool");
        let done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&done);
        assert_ok!(pool.submit(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
        }));

        pool.drain().await;
        assert!(done.load(Ordering::SeqCst));
    }
}
