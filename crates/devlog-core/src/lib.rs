//! Rendering primitives for the devlog developer console.
//!
//! - [`color`] / [`palette`] - RGB colors, SGR sequences and severity colors
//! - [`wrap`] - escape-aware word wrapping
//! - [`message`] - printf / indexed / literal template expansion
//! - [`record`] / [`exception`] / [`level`] - the records being rendered
//! - [`registry`] - bounded exception store behind lookup links

#![forbid(unsafe_code)]

pub mod color;
pub mod exception;
pub mod level;
pub mod logging;
pub mod message;
pub mod palette;
pub mod record;
pub mod registry;
pub mod wrap;

pub use color::{Color, ColorSupport, bold};
pub use exception::{ExceptionInfo, StackFrame};
pub use level::Level;
pub use message::{MessageRenderer, format_indexed};
pub use record::{Arg, ArgKind, FormatStyle, LogRecord, SPAN_ID_KEY, TRACE_ID_KEY};
pub use registry::{ExceptionRegistry, MAX_ENTRIES, exception_id};
pub use wrap::{visible_width, wrap};
