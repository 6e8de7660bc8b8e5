//! Recycling allocator for log records
//!
//! The pool keeps two lists. The producer pops from the allocation list; the
//! dispatcher pushes drained records back onto the free list. When the
//! allocation list runs dry the two lists are swapped, and when both are
//! empty a fresh batch is allocated up front. The free list never grows past
//! its capacity, so recycling cannot retain more than one batch worth of
//! records.

use super::log_message::LogMessage;
use super::spin_lock::SpinLock;

/// Records allocated per growth step
pub const DEFAULT_POOL_BATCH: usize = 3000;

pub struct MessagePool {
    batch_size: usize,
    alloc_msgs: SpinLock<Vec<LogMessage>>,
    free_msgs: SpinLock<Vec<LogMessage>>,
}

impl MessagePool {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            alloc_msgs: SpinLock::new(Vec::new()),
            free_msgs: SpinLock::new(Vec::new()),
        }
    }

    /// Hand out a record ready to be populated.
    ///
    /// Never blocks beyond the spin lock. If both lists are empty and a new
    /// batch cannot be reserved, a one-off overflow record is returned
    /// instead; it bypasses recycling.
    pub fn allocate(&self) -> LogMessage {
        let mut alloc = self.alloc_msgs.lock();
        if alloc.is_empty() {
            let mut free = self.free_msgs.lock();
            if free.is_empty() {
                if grow(&mut alloc, &mut free, self.batch_size).is_err() {
                    return LogMessage::overflow();
                }
            } else {
                std::mem::swap(&mut *alloc, &mut *free);
            }
        }
        alloc.pop().unwrap_or_else(LogMessage::overflow)
    }

    /// Return a drained batch. Records beyond the free list's spare capacity
    /// and overflow records are released; `batch` is left empty with its
    /// capacity intact.
    pub fn recycle(&self, batch: &mut Vec<LogMessage>) {
        let mut free = self.free_msgs.lock();
        let keep = batch.len().min(free.capacity() - free.len());
        free.extend(batch.drain(..keep).filter(|msg| !msg.is_overflow()));
        drop(free);
        batch.clear();
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Records ready in the allocation list
    pub fn alloc_len(&self) -> usize {
        self.alloc_msgs.lock().len()
    }

    /// Records waiting in the free list
    pub fn free_len(&self) -> usize {
        self.free_msgs.lock().len()
    }

    /// Records currently held by the pool
    pub fn pooled(&self) -> usize {
        self.alloc_len() + self.free_len()
    }
}

impl Default for MessagePool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_BATCH)
    }
}

fn grow(
    alloc: &mut Vec<LogMessage>,
    free: &mut Vec<LogMessage>,
    batch_size: usize,
) -> Result<(), std::collections::TryReserveError> {
    free.try_reserve_exact(batch_size)?;
    alloc.try_reserve_exact(batch_size)?;
    alloc.extend((0..batch_size).map(|_| LogMessage::new()));
    Ok(())
}
