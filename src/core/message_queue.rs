//! Double-buffered producer queue
//!
//! Producers append to the write buffer under a spin lock. The dispatcher
//! swaps its own (empty) read buffer with the write buffer under the same
//! lock, so the critical section on both sides is a push or a pointer swap.
//! The two vectors ping-pong between producer and dispatcher and keep their
//! capacity.

use super::log_message::LogMessage;
use super::spin_lock::SpinLock;
#[cfg(test)]
use super::spin_lock::SpinLockGuard;

/// Outcome of a drain attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drained {
    /// Records were swapped into the caller's buffer
    Ready,
    /// The write buffer was empty
    Empty,
    /// The lock was held by a producer; nothing was taken this cycle
    Contended,
}

#[derive(Default)]
pub struct MessageQueue {
    write_msgs: SpinLock<Vec<LogMessage>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Safe from any thread; holds the lock for one push.
    #[inline]
    pub fn put(&self, msg: LogMessage) {
        self.write_msgs.lock().push(msg);
    }

    /// Swap the write buffer into `read_msgs`, which must be empty.
    ///
    /// While the service is running this only tries the lock, so one busy
    /// producer cannot stall the dispatcher; records left behind stay in the
    /// write buffer for the next cycle. When `running` is false the lock is
    /// awaited so the final pass sees every record.
    pub fn drain(&self, running: bool, read_msgs: &mut Vec<LogMessage>) -> Drained {
        debug_assert!(read_msgs.is_empty());
        let mut write_msgs = if running {
            match self.write_msgs.try_lock() {
                Some(guard) => guard,
                None => return Drained::Contended,
            }
        } else {
            self.write_msgs.lock()
        };

        if write_msgs.is_empty() {
            return Drained::Empty;
        }
        std::mem::swap(&mut *write_msgs, read_msgs);
        Drained::Ready
    }

    /// Records waiting in the write buffer
    pub fn len(&self) -> usize {
        self.write_msgs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold the write lock, as a producer mid-push would
    #[cfg(test)]
    pub(crate) fn write_msgs_for_test(&self) -> SpinLockGuard<'_, Vec<LogMessage>> {
        self.write_msgs.lock()
    }
}
