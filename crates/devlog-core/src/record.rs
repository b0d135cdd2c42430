//! The log record consumed by the formatter.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::exception::ExceptionInfo;
use crate::level::Level;

/// Metadata key carrying the distributed trace identifier.
pub const TRACE_ID_KEY: &str = "traceId";
/// Metadata key carrying the span identifier.
pub const SPAN_ID_KEY: &str = "spanId";

/// How a message template is expanded against its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatStyle {
    /// `%s`/`%d`-style directives.
    Printf,
    /// `{0}`-style positional placeholders.
    Indexed,
    /// The template is the message.
    #[default]
    Literal,
    /// Unrecognized style; renders nothing when arguments are present.
    None,
}

/// Kind tag of an [`Arg`], used to pick a color for substituted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Str,
    Int,
    UInt,
    Float,
    Bool,
    Char,
    Uuid,
    TypeName,
}

/// A positional message argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Uuid(Uuid),
    /// Name of a type, e.g. the subject of a "no handler for" message.
    TypeName(String),
}

impl Arg {
    #[must_use]
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Str(_) => ArgKind::Str,
            Self::Int(_) => ArgKind::Int,
            Self::UInt(_) => ArgKind::UInt,
            Self::Float(_) => ArgKind::Float,
            Self::Bool(_) => ArgKind::Bool,
            Self::Char(_) => ArgKind::Char,
            Self::Uuid(_) => ArgKind::Uuid,
            Self::TypeName(_) => ArgKind::TypeName,
        }
    }

    /// Integral value, when the argument has one.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(*v)),
            Self::UInt(v) => Some(i128::from(*v)),
            Self::Char(c) => Some(i128::from(u32::from(*c))),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) | Self::TypeName(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Arg {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<Uuid> for Arg {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

/// A single log event as produced by the logging subsystem.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub logger_name: String,
    pub thread_name: String,
    pub message: String,
    pub args: Option<Vec<Arg>>,
    pub style: FormatStyle,
    pub metadata: BTreeMap<String, String>,
    pub exception: Option<Arc<ExceptionInfo>>,
}

impl LogRecord {
    /// A literal-style record stamped with the current time.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger_name: String::new(),
            thread_name: String::new(),
            message: message.into(),
            args: None,
            style: FormatStyle::Literal,
            metadata: BTreeMap::new(),
            exception: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger_name: impl Into<String>) -> Self {
        self.logger_name = logger_name.into();
        self
    }

    #[must_use]
    pub fn with_thread(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Attach arguments and the style used to substitute them.
    #[must_use]
    pub fn with_args(mut self, style: FormatStyle, args: impl IntoIterator<Item = Arg>) -> Self {
        self.style = style;
        self.args = Some(args.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set both trace context identifiers.
    #[must_use]
    pub fn with_trace_context(self, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        self.with_metadata(TRACE_ID_KEY, trace_id)
            .with_metadata(SPAN_ID_KEY, span_id)
    }

    #[must_use]
    pub fn with_exception(mut self, exception: impl Into<Arc<ExceptionInfo>>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
