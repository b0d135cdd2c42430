//! `log` crate integration.
//!
//! # Usage
//!
//! ```ignore
//! use devlog_console::logging::DevLogger;
//! use log::Level;
//!
//! // Simple initialization
//! DevLogger::init(Level::Info)?;
//!
//! // Or use the builder for more control
//! DevLogger::builder()
//!     .level(Level::Debug)
//!     .config(FormatterConfig::from_env()?)
//!     .init()?;
//! ```
//!
//! Key-value pairs named `trace_id`/`traceId` and `span_id`/`spanId` feed the
//! trace context; other pairs are kept as record metadata.

use std::sync::Arc;

use devlog_core::logging::targets;
use devlog_core::{ExceptionRegistry, LogRecord};
use log::kv::{self, Key, Value, VisitSource};
use log::{Level, LevelFilter, Log, Metadata, Record};

use super::{current_thread_name, metadata_key};
use crate::config::FormatterConfig;
use crate::console::{ConsoleHandle, DevConsole};
use crate::formatter::DevFormatter;

/// Logger that formats every record with a [`DevFormatter`].
pub struct DevLogger {
    formatter: DevFormatter,
    console: ConsoleHandle,
    min_level: Level,
}

impl DevLogger {
    /// Create a logger with default configuration and a fresh registry.
    #[must_use]
    pub fn new(min_level: Level) -> Self {
        DevLoggerBuilder::new().level(min_level).build()
    }

    #[must_use]
    pub fn builder() -> DevLoggerBuilder {
        DevLoggerBuilder::new()
    }

    /// Initialize as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(min_level: Level) -> Result<(), log::SetLoggerError> {
        DevLoggerBuilder::new().level(min_level).init()
    }

    /// Initialize as the global logger, ignoring errors if already set.
    pub fn try_init(min_level: Level) {
        let _ = Self::init(min_level);
    }

    #[must_use]
    pub fn formatter(&self) -> &DevFormatter {
        &self.formatter
    }

    /// Convert a `log::Record` into a [`LogRecord`].
    fn to_record(record: &Record<'_>) -> LogRecord {
        let mut converted = LogRecord::new(record.level().into(), record.args().to_string())
            .with_logger(record.target())
            .with_thread(current_thread_name());

        let mut pairs = PairCollector::default();
        // The collector never fails.
        let _ = record.key_values().visit(&mut pairs);
        for (key, value) in pairs.0 {
            converted = converted.with_metadata(key, value);
        }
        converted
    }
}

#[derive(Default)]
struct PairCollector(Vec<(String, String)>);

impl<'kvs> VisitSource<'kvs> for PairCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0
            .push((metadata_key(key.as_str()).to_string(), value.to_string()));
        Ok(())
    }
}

/// Builder for configuring the logger.
///
/// # Example
///
/// ```ignore
/// use devlog_console::logging::DevLoggerBuilder;
/// use log::Level;
///
/// DevLoggerBuilder::new()
///     .level(Level::Debug)
///     .registry(shared_registry.clone())
///     .init()
///     .expect("Failed to initialize logger");
/// ```
#[derive(Debug)]
pub struct DevLoggerBuilder {
    min_level: Level,
    config: FormatterConfig,
    registry: Option<Arc<ExceptionRegistry>>,
    console: ConsoleHandle,
}

impl Default for DevLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DevLoggerBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: Level::Info,
            config: FormatterConfig::default(),
            registry: None,
            console: ConsoleHandle::Global,
        }
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set the minimum log level from a LevelFilter.
    #[must_use]
    pub fn level_filter(mut self, filter: LevelFilter) -> Self {
        self.min_level = filter.to_level().unwrap_or(Level::Trace);
        self
    }

    /// Set the formatter configuration.
    #[must_use]
    pub fn config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an exception registry, e.g. with the server handling lookups.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ExceptionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Write to `console` instead of the global console.
    #[must_use]
    pub fn console(mut self, console: Arc<DevConsole>) -> Self {
        self.console = ConsoleHandle::Owned(console);
        self
    }

    /// Build the logger without installing it.
    #[must_use]
    pub fn build(self) -> DevLogger {
        let registry = self.registry.unwrap_or_default();
        DevLogger {
            formatter: DevFormatter::new(self.config, registry),
            console: self.console,
            min_level: self.min_level,
        }
    }

    /// Build and install as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.min_level;
        let logger = Box::new(self.build());
        log::set_boxed_logger(logger)?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Build and install, ignoring errors if already set.
    pub fn try_init(self) {
        let _ = self.init();
    }
}

impl Log for DevLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        // Console failures cannot be written to the console that failed.
        metadata.level() <= self.min_level && !metadata.target().starts_with(targets::CONSOLE)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let block = self.formatter.format(&Self::to_record(record));
        self.console.get().write_block(&block);
    }

    fn flush(&self) {
        self.console.get().flush();
    }
}
