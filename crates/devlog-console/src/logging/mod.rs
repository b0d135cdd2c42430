//! Logging ecosystem integrations.
//!
//! - [`DevLogger`] - a `log` crate logger implementation
//! - [`DevLayer`] / [`DevSubscriberBuilder`] - tracing subscriber integration
//!
//! Both convert the incoming event to a [`LogRecord`](devlog_core::LogRecord),
//! format it with a [`DevFormatter`](crate::DevFormatter) and write the block
//! to a [`DevConsole`](crate::DevConsole).
//!
//! # Example
//!
//! ```ignore
//! use devlog_console::logging::DevSubscriberBuilder;
//! use devlog_console::FormatterConfig;
//!
//! DevSubscriberBuilder::new()
//!     .with_config(FormatterConfig::from_env()?)
//!     .with_registry(registry.clone())
//!     .init()?;
//! ```

mod logger;
mod subscriber;

use devlog_core::{SPAN_ID_KEY, TRACE_ID_KEY};

pub use logger::{DevLogger, DevLoggerBuilder};
pub use subscriber::{DevLayer, DevSubscriberBuilder};

/// Canonical metadata key for a structured field name.
fn metadata_key(key: &str) -> &str {
    match key {
        "trace_id" | "traceId" => TRACE_ID_KEY,
        "span_id" | "spanId" => SPAN_ID_KEY,
        other => other,
    }
}

/// Name of the calling thread, or its id when unnamed.
fn current_thread_name() -> String {
    let thread = std::thread::current();
    thread
        .name()
        .map_or_else(|| format!("{:?}", thread.id()), str::to_string)
}
