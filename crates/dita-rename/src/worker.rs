//! Background batch execution
//!
//! Batches are synchronous and run on tokio's blocking pool so the caller's
//! runtime stays responsive. A [`BatchSlot`] admits one batch at a time, and
//! each batch delivers exactly one result over a oneshot channel. There is no
//! cancellation once a batch has started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::WorkerError;

/// Admits one running batch at a time
#[derive(Debug, Clone, Default)]
pub struct BatchSlot {
    running: Arc<AtomicBool>,
}

/// Held while a batch runs; frees the slot on drop
#[derive(Debug)]
pub struct BatchGuard {
    running: Arc<AtomicBool>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Pending result of a spawned batch
#[derive(Debug)]
pub struct BatchHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> BatchHandle<T> {
    /// Wait for the batch result
    pub async fn result(self) -> Result<T, WorkerError> {
        self.receiver.await.map_err(|_| WorkerError::Dropped)
    }
}

impl BatchSlot {
    /// Idle slot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a batch holds the slot
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Claim the slot, or `None` when a batch is already running
    #[must_use]
    pub fn try_start(&self) -> Option<BatchGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BatchGuard {
                running: Arc::clone(&self.running),
            })
    }

    /// Run `job` on the blocking pool.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`WorkerError::Busy`] while another batch holds the slot.
    pub fn spawn<F, T>(&self, job: F) -> Result<BatchHandle<T>, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.try_start().ok_or(WorkerError::Busy)?;
        let (sender, receiver) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            let result = job();
            drop(guard);
            if sender.send(result).is_err() {
                tracing::warn!("Batch finished after its caller went away");
            }
        });
        Ok(BatchHandle { receiver })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_admits_one_batch() {
        let slot = BatchSlot::new();
        let guard = slot.try_start().unwrap();
        assert!(slot.is_running());
        assert!(slot.try_start().is_none());
        drop(guard);
        assert!(!slot.is_running());
        assert!(slot.try_start().is_some());
    }

    #[tokio::test]
    async fn spawned_batch_delivers_once_and_frees_slot() {
        let slot = BatchSlot::new();
        let (release, wait) = std::sync::mpsc::channel::<()>();
        let handle = slot
            .spawn(move || {
                wait.recv().unwrap();
                42
            })
            .unwrap();

        assert!(matches!(slot.spawn(|| 0), Err(WorkerError::Busy)));
        release.send(()).unwrap();
        assert_eq!(handle.result().await.unwrap(), 42);
        assert!(!slot.is_running());
    }
}
