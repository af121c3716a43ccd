//! Per-employee serialization.
//!
//! Update and delete run a fetch, asset, persist sequence that must not
//! interleave with another mutation of the same employee.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::features::employees::models::EmployeeId;

/// Async mutexes keyed by employee id.
///
/// An entry exists only while some caller holds or waits for it.
#[derive(Default)]
pub struct EmployeeLocks {
    locks: DashMap<EmployeeId, Arc<Mutex<()>>>,
}

/// Exclusive access to one employee; released on drop
pub struct EmployeeLockGuard<'a> {
    locks: &'a EmployeeLocks,
    id: EmployeeId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: EmployeeId) -> EmployeeLockGuard<'_> {
        // The shard lock is held only for the lookup/insert, never across the await
        let mutex = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;

        EmployeeLockGuard {
            locks: self,
            id,
            guard: Some(guard),
        }
    }

    /// Number of employees currently locked or awaited
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for EmployeeLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map itself still references the mutex when nobody waits
        self.locks
            .locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
