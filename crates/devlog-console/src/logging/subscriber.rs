//! Tracing subscriber integration.
//!
//! Provides a tracing `Layer` and builder that route events through the
//! [`DevFormatter`]. Error-valued fields become the record's exception chain:
//!
//! ```ignore
//! tracing::error!(error = &err as &dyn std::error::Error, "request failed");
//! ```

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use devlog_core::logging::targets;
use devlog_core::{
    ExceptionInfo, ExceptionRegistry, LogRecord, SPAN_ID_KEY, StackFrame, TRACE_ID_KEY,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use super::{current_thread_name, metadata_key};
use crate::config::FormatterConfig;
use crate::console::{ConsoleHandle, DevConsole};
use crate::formatter::DevFormatter;

/// A tracing layer that renders events with the developer formatter.
pub struct DevLayer {
    formatter: DevFormatter,
    console: ConsoleHandle,
}

impl DevLayer {
    /// Create a layer writing to the global console.
    #[must_use]
    pub fn new(formatter: DevFormatter) -> Self {
        Self {
            formatter,
            console: ConsoleHandle::Global,
        }
    }

    /// Write to `console` instead of the global console.
    #[must_use]
    pub fn with_console(mut self, console: Arc<DevConsole>) -> Self {
        self.console = ConsoleHandle::Owned(console);
        self
    }

    #[must_use]
    pub fn formatter(&self) -> &DevFormatter {
        &self.formatter
    }

    fn to_record(event: &Event<'_>) -> LogRecord {
        let metadata = event.metadata();
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let mut message = collector
            .message
            .unwrap_or_else(|| metadata.name().to_string());
        for (key, value) in &collector.fields {
            message.push_str(&format!(" {key}={value}"));
        }

        let mut record = LogRecord::new((*metadata.level()).into(), message)
            .with_logger(metadata.target())
            .with_thread(current_thread_name());
        for (key, value) in collector.context {
            record = record.with_metadata(key, value);
        }

        if let Some(mut exception) = collector.error {
            if let Some(frame) = event_frame(event) {
                exception.frames.insert(0, frame);
            }
            record = record.with_exception(exception);
        }
        record
    }
}

/// Call site of the event, used as the head frame of its exception.
fn event_frame(event: &Event<'_>) -> Option<StackFrame> {
    let metadata = event.metadata();
    let file = metadata.file()?;
    let file_name = Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file);
    Some(StackFrame::new(
        metadata.module_path().unwrap_or_else(|| metadata.target()),
        "",
        file_name,
        metadata.line().unwrap_or(0),
    ))
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    error: Option<ExceptionInfo>,
    context: Vec<(&'static str, String)>,
    fields: Vec<(String, String)>,
}

impl FieldCollector {
    fn record_value(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => {
                if self.message.is_none() {
                    self.message = Some(value);
                }
            }
            name => {
                let key = metadata_key(name);
                if key == TRACE_ID_KEY || key == SPAN_ID_KEY {
                    self.context.push((key, value));
                } else {
                    self.fields.push((name.to_string(), value));
                }
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        if self.error.is_none() {
            self.error = Some(ExceptionInfo::from_dyn_error(value));
        } else {
            self.record_value(field, value.to_string());
        }
    }
}

impl<S> Layer<S> for DevLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with(targets::CONSOLE) {
            return;
        }
        let block = self.formatter.format(&Self::to_record(event));
        self.console.get().write_block(&block);
    }
}

/// Builder for configuring a developer tracing subscriber.
#[derive(Debug)]
pub struct DevSubscriberBuilder {
    config: FormatterConfig,
    registry: Option<Arc<ExceptionRegistry>>,
    console: ConsoleHandle,
    level_filter: LevelFilter,
}

impl Default for DevSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DevSubscriberBuilder {
    /// Create a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            registry: None,
            console: ConsoleHandle::Global,
            level_filter: LevelFilter::INFO,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an exception registry, e.g. with the server handling lookups.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ExceptionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_console(mut self, console: Arc<DevConsole>) -> Self {
        self.console = ConsoleHandle::Owned(console);
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn with_level_filter(mut self, filter: LevelFilter) -> Self {
        self.level_filter = filter;
        self
    }

    /// Build the layer alone, for composing with other layers.
    #[must_use]
    pub fn build_layer(self) -> DevLayer {
        let registry = self.registry.unwrap_or_default();
        DevLayer {
            formatter: DevFormatter::new(self.config, registry),
            console: self.console,
        }
    }

    /// Build the subscriber without installing it.
    #[must_use]
    pub fn build(self) -> impl Subscriber + Send + Sync {
        let level_filter = self.level_filter;
        tracing_subscriber::registry()
            .with(level_filter)
            .with(self.build_layer())
    }

    /// Build and install as the global subscriber.
    pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
        tracing::subscriber::set_global_default(self.build())
    }
}
