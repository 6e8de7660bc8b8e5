//! The background thread that drains producers and writes destinations
//!
//! The dispatcher owns every destination outright. Registration changes
//! arrive as [`Command`]s over a channel, so writes and flushes take no lock.

use super::agent::LogAgent;
use super::log_level::LogLevel;
use super::log_message::LogMessage;
use super::message_queue::Drained;
use super::metrics::LoggerMetrics;
use super::service::ServiceShared;
use crate::destinations::{DestTarget, Destination};
use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Alert on the first dropped record and every this many thereafter
const DROP_ALERT_INTERVAL: u64 = 1000;

/// Registry change applied by the dispatcher between batches
pub(crate) enum Command {
    AddFeature(String, Destination),
    DelFeature(String),
    AddLevel(LogLevel, Destination),
    DelLevel(LogLevel),
    CleanTime(DestTarget, Duration),
    IgnorePrefix(DestTarget, bool),
    IgnoreSuffix(DestTarget, bool),
}

/// Every destination a record can be routed to
pub(crate) struct DestinationSet {
    pub console: Destination,
    pub main: Destination,
    pub levels: HashMap<LogLevel, Destination>,
    pub features: HashMap<String, Destination>,
}

impl DestinationSet {
    pub fn new(console: Destination, main: Destination) -> Self {
        Self {
            console,
            main,
            levels: HashMap::new(),
            features: HashMap::new(),
        }
    }

    fn target_mut(&mut self, target: &DestTarget) -> Option<&mut Destination> {
        match target {
            DestTarget::Main => Some(&mut self.main),
            DestTarget::Console => Some(&mut self.console),
            DestTarget::Feature(name) => self.features.get_mut(name),
            DestTarget::Level(level) => self.levels.get_mut(level),
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::AddFeature(name, dest) => {
                self.features.insert(name, dest);
            }
            Command::DelFeature(name) => {
                self.features.remove(&name);
            }
            Command::AddLevel(level, dest) => {
                self.levels.insert(level, dest);
            }
            Command::DelLevel(level) => {
                self.levels.remove(&level);
            }
            Command::CleanTime(target, clean_time) => {
                if let Some(dest) = self.target_mut(&target) {
                    dest.set_clean_time(clean_time);
                }
            }
            Command::IgnorePrefix(target, ignore) => {
                if let Some(dest) = self.target_mut(&target) {
                    dest.ignore_prefix(ignore);
                }
            }
            Command::IgnoreSuffix(target, ignore) => {
                if let Some(dest) = self.target_mut(&target) {
                    dest.ignore_suffix(ignore);
                }
            }
        }
    }

    fn flush_all(&mut self) {
        flush_isolated(&mut self.console);
        flush_isolated(&mut self.main);
        for dest in self.levels.values_mut() {
            flush_isolated(dest);
        }
        for dest in self.features.values_mut() {
            flush_isolated(dest);
        }
    }
}

pub(crate) struct Dispatcher {
    pub shared: Arc<ServiceShared>,
    pub dests: DestinationSet,
    pub commands: Receiver<Command>,
    pub stop_signal: Receiver<()>,
    pub period: Duration,
    pub max_skipped_drains: u32,
}

impl Dispatcher {
    pub fn run(mut self) {
        let mut agents: Vec<Arc<LogAgent>> = Vec::new();
        let mut generation = u64::MAX;
        let mut read_msgs: Vec<LogMessage> = Vec::new();

        loop {
            let running = self.shared.is_running();
            self.apply_commands();

            let current = self.shared.agents_generation();
            if current != generation {
                let (snapshot, seen) = self.shared.agents_snapshot();
                agents = snapshot;
                generation = seen;
            }

            let mut worked = false;
            let mut drained_retired = Vec::new();
            for agent in &agents {
                let retired = agent.is_retired();
                let forced = running
                    && self.max_skipped_drains > 0
                    && agent.skipped_drains() >= self.max_skipped_drains;
                if forced {
                    self.shared.metrics.record_forced_drain();
                }

                match agent.drain(!running || forced, &mut read_msgs) {
                    Drained::Ready => {
                        worked = true;
                        // pick up registrations sent before these records
                        self.apply_commands();
                        let daemon = self.shared.is_daemon();
                        for msg in &read_msgs {
                            self.route(msg, daemon);
                        }
                        agent.recycle(&mut read_msgs);
                    }
                    Drained::Empty => {
                        if retired {
                            drained_retired.push(agent.id());
                        }
                    }
                    Drained::Contended => {
                        self.shared.metrics.record_contended_drain();
                    }
                }
            }

            if !drained_retired.is_empty() {
                self.shared.remove_agents(&drained_retired);
            }
            if worked {
                self.dests.flush_all();
            }
            if !running && !worked {
                break;
            }

            // returns at once when stop drops the sender
            let _ = self.stop_signal.recv_timeout(self.period);
        }

        self.apply_commands();
        self.dests.flush_all();
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.dests.apply(command);
        }
    }

    /// Console (unless daemonized), main, then the level and feature
    /// destinations registered for this record
    fn route(&mut self, msg: &LogMessage, daemon: bool) {
        let metrics = &self.shared.metrics;
        let mut ok = true;
        if !daemon {
            ok &= write_isolated(&mut self.dests.console, msg);
        }
        ok &= write_isolated(&mut self.dests.main, msg);
        if let Some(dest) = self.dests.levels.get_mut(&msg.level()) {
            ok &= write_isolated(dest, msg);
        }
        if !msg.feature().is_empty() {
            if let Some(dest) = self.dests.features.get_mut(msg.feature()) {
                ok &= write_isolated(dest, msg);
            }
        }

        if ok {
            metrics.record_dispatched();
        } else {
            record_drop(metrics);
        }
    }
}

fn record_drop(metrics: &LoggerMetrics) {
    let dropped = metrics.record_dropped();
    if dropped == 0 || (dropped + 1) % DROP_ALERT_INTERVAL == 0 {
        eprintln!(
            "[LOGGER WARNING] {} log records failed to reach a destination. \
             Check disk space and permissions of the log root.",
            dropped + 1
        );
    }
}

fn write_isolated(dest: &mut Destination, msg: &LogMessage) -> bool {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| dest.write(msg)));
    match result {
        Ok(Ok(())) => true,
        Ok(Err(_)) => false,
        Err(panic_info) => {
            eprintln!(
                "[LOGGER CRITICAL] Destination '{}' panicked: {}. \
                 Other destinations continue to function.",
                dest.name(),
                panic_message(panic_info.as_ref())
            );
            false
        }
    }
}

fn flush_isolated(dest: &mut Destination) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| dest.flush()));
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Destination '{}' flush failed: {}", dest.name(), e);
        }
        Err(panic_info) => {
            eprintln!(
                "[LOGGER CRITICAL] Destination '{}' panicked during flush: {}",
                dest.name(),
                panic_message(panic_info.as_ref())
            );
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
