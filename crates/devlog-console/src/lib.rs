#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod access_log;
pub mod config;
pub mod console;
pub mod detection;
pub mod formatter;
pub mod logging; // DevLogger, DevLayer
pub mod lookup; // Exception detail pages
pub mod testing; // Test utilities

pub use config::{ConfigError, FormatterConfig};
pub use console::{DevConsole, console, init_console};
pub use detection::{DisplayContext, should_enable_color};
pub use devlog_core;
pub use devlog_core::{ExceptionInfo, ExceptionRegistry, Level, LogRecord, StackFrame};
pub use formatter::DevFormatter;
pub use lookup::{LookupResponse, exception_id_from_path, lookup};
