//! The log service: lifecycle, registration and the producer registry
//!
//! `start` creates the main destination and spawns the dispatcher; `stop`
//! flips the running flag, wakes the dispatcher and joins it after its final
//! blocking drain of every producer. There is no global instance; the host
//! owns the [`LogService`] and passes it (or its producer handles) around.

use super::agent::{LogAgent, ProducerHandle};
use super::config::ServiceConfig;
use super::dispatcher::{Command, DestinationSet, Dispatcher};
use super::error::{LoggerError, Result};
use super::log_level::{LogFilter, LogLevel};
use super::metrics::LoggerMetrics;
use crate::destinations::{DestTarget, Destination, FixedFileDest, RollingFileDest, StdoutDest};
use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// State shared by the service, its producers and the dispatcher
pub(crate) struct ServiceShared {
    running: AtomicBool,
    daemon: AtomicBool,
    pub(crate) filter: LogFilter,
    pub(crate) metrics: Arc<LoggerMetrics>,
    agents: Mutex<Vec<Arc<LogAgent>>>,
    agents_generation: AtomicU64,
    next_agent_id: AtomicU64,
}

impl ServiceShared {
    fn new(daemon: bool) -> Self {
        Self {
            running: AtomicBool::new(true),
            daemon: AtomicBool::new(daemon),
            filter: LogFilter::new(),
            metrics: Arc::new(LoggerMetrics::new()),
            agents: Mutex::new(Vec::new()),
            agents_generation: AtomicU64::new(0),
            next_agent_id: AtomicU64::new(1),
        }
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_daemon(&self) -> bool {
        self.daemon.load(Ordering::Relaxed)
    }

    pub(crate) fn agents_generation(&self) -> u64 {
        self.agents_generation.load(Ordering::Acquire)
    }

    /// Current agents and the generation they belong to
    pub(crate) fn agents_snapshot(&self) -> (Vec<Arc<LogAgent>>, u64) {
        let agents = self.agents.lock();
        (agents.clone(), self.agents_generation())
    }

    fn add_agent(&self, agent: Arc<LogAgent>) {
        let mut agents = self.agents.lock();
        agents.push(agent);
        self.agents_generation.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn remove_agents(&self, ids: &[u64]) {
        let mut agents = self.agents.lock();
        agents.retain(|agent| !ids.contains(&agent.id()));
        self.agents_generation.fetch_add(1, Ordering::Release);
    }

    fn agent_count(&self) -> usize {
        self.agents.lock().len()
    }
}

/// Feature and level keys currently registered, mirrored on the caller side
/// so registration calls can answer without asking the dispatcher
#[derive(Default)]
struct DestRegistry {
    features: HashSet<String>,
    levels: HashSet<LogLevel>,
}

/// Asynchronous logging engine
///
/// # Examples
///
/// ```no_run
/// use log_service::prelude::*;
/// use log_service::{error, info};
///
/// let config = ServiceConfig::new("/var/log/game", "lobby")
///     .with_rolling(RollingType::Daily)
///     .with_daemon(true);
/// let service = LogService::start(config).unwrap();
/// service.add_lvl_dest(LogLevel::Error);
/// service.add_dest("chat");
///
/// let producer = service.register_producer();
/// info!(producer, "lobby ready on port {}", 7000);
/// error!(producer, "player {} kicked", 42);
/// producer.info("hello", "", "chat", file!(), line!());
///
/// service.stop();
/// ```
pub struct LogService {
    config: ServiceConfig,
    shared: Arc<ServiceShared>,
    registry: Mutex<DestRegistry>,
    commands: Sender<Command>,
    stop_signal: Mutex<Option<Sender<()>>>,
    dispatcher: Mutex<Option<thread::JoinHandle<()>>>,
}

impl LogService {
    /// Create the log root and the main destination, then spawn the
    /// dispatcher thread
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the log directories
    /// cannot be created or the thread cannot be spawned
    pub fn start(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.log_root).map_err(|e| {
            LoggerError::io_operation(
                "create log root",
                format!("Failed to create directory '{}'", config.log_root.display()),
                e,
            )
        })?;

        let shared = Arc::new(ServiceShared::new(config.daemon));
        let main = RollingFileDest::new(
            config.service_path(),
            config.service.clone(),
            config.rolling,
            config.max_file_size,
            config.clean_time(),
        )?
        .with_metrics(Arc::clone(&shared.metrics));
        let console = StdoutDest::with_colors(config.console_colors);

        let (commands, command_rx) = unbounded();
        let (stop_signal, stop_rx) = crossbeam_channel::bounded(1);
        let dispatcher = Dispatcher {
            shared: Arc::clone(&shared),
            dests: DestinationSet::new(Destination::Stdout(console), Destination::Rolling(main)),
            commands: command_rx,
            stop_signal: stop_rx,
            period: config.dispatch_period(),
            max_skipped_drains: config.max_skipped_drains,
        };
        let handle = thread::Builder::new()
            .name(format!("log-{}", config.service_id()))
            .spawn(move || dispatcher.run())
            .map_err(|e| LoggerError::io_operation("spawn dispatcher", "thread spawn failed", e))?;

        Ok(Self {
            config,
            shared,
            registry: Mutex::new(DestRegistry::default()),
            commands,
            stop_signal: Mutex::new(Some(stop_signal)),
            dispatcher: Mutex::new(Some(handle)),
        })
    }

    /// Create a new producer identity with its own pool and queue
    pub fn register_producer(&self) -> ProducerHandle {
        let id = self.shared.next_agent_id.fetch_add(1, Ordering::Relaxed);
        let agent = Arc::new(LogAgent::new(id, self.config.pool_batch_size));
        self.shared.add_agent(Arc::clone(&agent));
        ProducerHandle::new(agent, Arc::clone(&self.shared))
    }

    /// Register a rolling destination for records tagged with `feature`
    ///
    /// Returns false if the feature is already registered, names the main
    /// destination, or its directory cannot be created.
    pub fn add_dest(&self, feature: &str) -> bool {
        if feature.is_empty() || feature == self.config.service || !self.is_running() {
            return false;
        }
        let mut registry = self.registry.lock();
        if registry.features.contains(feature) {
            return false;
        }
        let dest = match self.rolling_dest(self.config.feature_path(feature), feature) {
            Ok(dest) => dest,
            Err(e) => {
                eprintln!("[LOGGER ERROR] Cannot add destination '{}': {}", feature, e);
                return false;
            }
        };
        if self.send(Command::AddFeature(feature.to_string(), dest)) {
            registry.features.insert(feature.to_string());
            true
        } else {
            false
        }
    }

    /// Register a rolling destination for every record at `level`
    pub fn add_lvl_dest(&self, level: LogLevel) -> bool {
        if !self.is_running() {
            return false;
        }
        let mut registry = self.registry.lock();
        if registry.levels.contains(&level) {
            return false;
        }
        let feature = level.feature_name();
        let dir = self.config.service_path().join(&feature);
        let dest = match self.rolling_dest(dir, &feature) {
            Ok(dest) => dest,
            Err(e) => {
                eprintln!("[LOGGER ERROR] Cannot add {} destination: {}", level, e);
                return false;
            }
        };
        if self.send(Command::AddLevel(level, dest)) {
            registry.levels.insert(level);
            true
        } else {
            false
        }
    }

    /// Register a fixed-name mapped file for records tagged with `feature`,
    /// written without the line prefix
    pub fn add_file_dest(&self, feature: &str, file_name: &str) -> bool {
        if feature.is_empty() || feature == self.config.service || !self.is_running() {
            return false;
        }
        let mut registry = self.registry.lock();
        if registry.features.contains(feature) {
            return false;
        }
        let path = self.config.service_path().join(file_name);
        let dest = match FixedFileDest::new(path, feature) {
            Ok(dest) => dest,
            Err(e) => {
                eprintln!("[LOGGER ERROR] Cannot add file destination '{}': {}", feature, e);
                return false;
            }
        };
        if self.send(Command::AddFeature(feature.to_string(), Destination::File(dest))) {
            registry.features.insert(feature.to_string());
            true
        } else {
            false
        }
    }

    /// Remove a feature destination; its file is closed
    pub fn del_dest(&self, feature: &str) -> bool {
        let mut registry = self.registry.lock();
        registry.features.remove(feature) && self.send(Command::DelFeature(feature.to_string()))
    }

    pub fn del_lvl_dest(&self, level: LogLevel) -> bool {
        let mut registry = self.registry.lock();
        registry.levels.remove(&level) && self.send(Command::DelLevel(level))
    }

    /// Retention age of a rolling destination's files
    pub fn set_clean_time(&self, target: DestTarget, clean_time: Duration) {
        self.send(Command::CleanTime(target, clean_time));
    }

    pub fn ignore_prefix(&self, target: DestTarget, ignore: bool) {
        self.send(Command::IgnorePrefix(target, ignore));
    }

    pub fn ignore_suffix(&self, target: DestTarget, ignore: bool) {
        self.send(Command::IgnoreSuffix(target, ignore));
    }

    /// Turn a level on or off for every producer
    pub fn filter(&self, level: LogLevel, on: bool) {
        self.shared.filter.filter(level, on);
    }

    /// True when `level` is filtered out
    pub fn is_filter(&self, level: LogLevel) -> bool {
        self.shared.filter.is_filter(level)
    }

    /// Suppress (or restore) the console echo
    pub fn daemon(&self, daemon: bool) {
        self.shared.daemon.store(daemon, Ordering::Relaxed);
    }

    pub fn is_daemon(&self) -> bool {
        self.shared.is_daemon()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Registered producers, including dropped ones whose records are still
    /// being drained
    pub fn producer_count(&self) -> usize {
        self.shared.agent_count()
    }

    /// Stop the dispatcher after a final drain of every producer
    ///
    /// Every record queued before this call is written and every file is
    /// closed when it returns. Calling it again is a no-op.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        drop(self.stop_signal.lock().take());

        let handle = self.dispatcher.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Dispatcher thread panicked during shutdown: {:?}", e);
            }
        }
    }

    fn rolling_dest(&self, dir: std::path::PathBuf, feature: &str) -> Result<Destination> {
        let dest = RollingFileDest::new(
            dir,
            feature,
            self.config.rolling,
            self.config.max_file_size,
            self.config.clean_time(),
        )?
        .with_metrics(Arc::clone(&self.shared.metrics));
        Ok(Destination::Rolling(dest))
    }

    fn send(&self, command: Command) -> bool {
        if !self.is_running() {
            return false;
        }
        self.commands.send(command).is_ok()
    }
}

impl Drop for LogService {
    fn drop(&mut self) {
        self.stop();

        let dropped = self.shared.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Log service shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.shared.metrics.drop_rate()
            );
        }
    }
}
