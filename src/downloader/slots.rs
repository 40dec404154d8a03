// Concurrency slots shared by every item download
//
// A slot is an owned semaphore permit. Dropping it returns the slot to the
// pool, so release happens exactly once on every exit path.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::errors::DownloadError;

/// Fixed-size pool of download slots
#[derive(Debug, Clone)]
pub struct SlotPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held slot; released on drop
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl SlotPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<Slot, DownloadError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DownloadError::Shutdown)?;
        Ok(Slot { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Refuse all future acquisitions. Held slots stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn drop_returns_slot() {
        let pool = SlotPool::new(2);
        let a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        assert_eq!(pool.in_use(), 2);
        drop(a);
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn waits_when_exhausted() {
        let pool = SlotPool::new(1);
        let held = pool.acquire().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(waiting.is_err());

        drop(held);
        let next = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn closed_pool_rejects() {
        let pool = SlotPool::new(1);
        pool.close();
        assert!(matches!(pool.acquire().await, Err(DownloadError::Shutdown)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(SlotPool::new(0).capacity(), 1);
    }
}
