//! Producer agents and the handles callers log through
//!
//! Every producer owns one [`LogAgent`]: a record pool and a queue that only
//! it appends to. The service keeps the agent registered until the handle is
//! dropped and the dispatcher has drained whatever was still queued.

use super::log_level::LogLevel;
use super::log_message::LogMessage;
use super::message_pool::MessagePool;
use super::message_queue::{Drained, MessageQueue};
use super::service::ServiceShared;
#[cfg(test)]
use super::spin_lock::SpinLockGuard;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

pub struct LogAgent {
    id: u64,
    pool: MessagePool,
    queue: MessageQueue,
    retired: AtomicBool,
    /// Consecutive drains that found the queue lock held
    skipped_drains: AtomicU32,
}

impl LogAgent {
    pub(crate) fn new(id: u64, batch_size: usize) -> Self {
        Self {
            id,
            pool: MessagePool::new(batch_size),
            queue: MessageQueue::new(),
            retired: AtomicBool::new(false),
            skipped_drains: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Records waiting for the dispatcher
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Records held by the pool
    pub fn pooled(&self) -> usize {
        self.pool.pooled()
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    /// Swap out queued records. `block` waits for the queue lock instead of
    /// giving up under contention.
    pub(crate) fn drain(&self, block: bool, read_msgs: &mut Vec<LogMessage>) -> Drained {
        let drained = self.queue.drain(!block, read_msgs);
        if drained == Drained::Contended {
            self.skipped_drains.fetch_add(1, Ordering::Relaxed);
        } else {
            self.skipped_drains.store(0, Ordering::Relaxed);
        }
        drained
    }

    pub(crate) fn skipped_drains(&self) -> u32 {
        self.skipped_drains.load(Ordering::Relaxed)
    }

    pub(crate) fn recycle(&self, batch: &mut Vec<LogMessage>) {
        self.pool.recycle(batch);
    }
}

impl fmt::Debug for LogAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogAgent")
            .field("id", &self.id)
            .field("retired", &self.is_retired())
            .finish()
    }
}

/// Opaque producer identity returned by
/// [`LogService::register_producer`](crate::core::LogService::register_producer)
///
/// Emission never fails and never blocks on I/O. A handle may be shared by
/// reference across threads; records from one thread keep their order.
///
/// # Examples
///
/// ```no_run
/// use log_service::prelude::*;
///
/// let service = LogService::start(ServiceConfig::new("/tmp/logs", "demo")).unwrap();
/// let producer = service.register_producer();
///
/// producer.info("server started", "boot", "", file!(), line!());
/// producer.output(LogLevel::Warn, "slow tick", "loop", "", file!(), line!());
/// ```
pub struct ProducerHandle {
    agent: Arc<LogAgent>,
    shared: Arc<ServiceShared>,
}

impl ProducerHandle {
    pub(crate) fn new(agent: Arc<LogAgent>, shared: Arc<ServiceShared>) -> Self {
        Self { agent, shared }
    }

    pub fn id(&self) -> u64 {
        self.agent.id()
    }

    /// Queue one record
    ///
    /// Records queued before [`LogService::stop`](crate::core::LogService::stop)
    /// is called are written before it returns. A call racing `stop` from
    /// another thread may be discarded; calls made after it are ignored.
    pub fn output(
        &self,
        level: LogLevel,
        msg: &str,
        tag: &str,
        feature: &str,
        source: &str,
        line: u32,
    ) {
        if let Some(mut record) = self.allocate(level) {
            record.option(level, msg, tag, feature, source, line);
            self.agent.queue.put(record);
        }
    }

    /// Queue one record, formatting straight into the pooled buffer
    pub fn output_fmt(
        &self,
        level: LogLevel,
        args: fmt::Arguments<'_>,
        tag: &str,
        feature: &str,
        source: &str,
        line: u32,
    ) {
        if let Some(mut record) = self.allocate(level) {
            record.option_fmt(level, args, tag, feature, source, line);
            self.agent.queue.put(record);
        }
    }

    /// Whether a record at `level` would be queued
    pub fn enabled(&self, level: LogLevel) -> bool {
        !self.shared.filter.is_filter(level) && self.shared.is_running()
    }

    /// Hold this producer's queue lock, as a producer mid-push would
    #[cfg(test)]
    pub(crate) fn queue_lock_for_test(&self) -> SpinLockGuard<'_, Vec<LogMessage>> {
        self.agent.queue.write_msgs_for_test()
    }

    fn allocate(&self, level: LogLevel) -> Option<LogMessage> {
        if self.shared.filter.is_filter(level) {
            self.shared.metrics.record_filtered();
            return None;
        }
        if !self.shared.is_running() {
            return None;
        }
        let record = self.agent.pool.allocate();
        if record.is_overflow() {
            self.shared.metrics.record_overflow_allocation();
        }
        Some(record)
    }

    pub fn debug(&self, msg: &str, tag: &str, feature: &str, source: &str, line: u32) {
        self.output(LogLevel::Debug, msg, tag, feature, source, line);
    }

    pub fn info(&self, msg: &str, tag: &str, feature: &str, source: &str, line: u32) {
        self.output(LogLevel::Info, msg, tag, feature, source, line);
    }

    pub fn warn(&self, msg: &str, tag: &str, feature: &str, source: &str, line: u32) {
        self.output(LogLevel::Warn, msg, tag, feature, source, line);
    }

    pub fn dump(&self, msg: &str, tag: &str, feature: &str, source: &str, line: u32) {
        self.output(LogLevel::Dump, msg, tag, feature, source, line);
    }

    pub fn error(&self, msg: &str, tag: &str, feature: &str, source: &str, line: u32) {
        self.output(LogLevel::Error, msg, tag, feature, source, line);
    }

    pub fn fatal(&self, msg: &str, tag: &str, feature: &str, source: &str, line: u32) {
        self.output(LogLevel::Fatal, msg, tag, feature, source, line);
    }
}

impl fmt::Debug for ProducerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerHandle")
            .field("id", &self.agent.id())
            .finish()
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        // the dispatcher unregisters the agent once its queue is empty
        self.agent.retire();
    }
}
