//! Record formatter.
//!
//! Turns one [`LogRecord`] into a block of colorized, wrapped text:
//!
//! ```text
//! 12:34:56 ERROR A serious error occurred
//!                [io.quarkus] (Quarkus Main)
//!                ↪ Something bad happened
//!                  RuntimeException TestExceptions.getEx1(TestExceptions.java:9)
//!                http://localhost:8080/q/exceptions/<id>
//! ```
//!
//! Records from the access-log logger are rendered as a request summary
//! instead, when their message parses as a common-log-format line.

use std::sync::Arc;

use chrono::Local;
use devlog_core::logging::{targets, trace};
use devlog_core::palette::{
    CTX_PRIMARY, CTX_SECONDARY, CTX_TERTIARY, DELIM, EXC_MESSAGE, EXC_PRIMARY, EXC_QUATERNARY,
    EXC_SECONDARY, EXC_TERTIARY, HI_TEXT, HTTP_CTX_IMPORTANT, LO_TEXT, level_color,
};
use devlog_core::{
    Color, ColorSupport, ExceptionInfo, ExceptionRegistry, Level, LogRecord, MessageRenderer,
    SPAN_ID_KEY, TRACE_ID_KEY, bold, wrap,
};

use crate::config::FormatterConfig;
use crate::access_log::{AccessLogEntry, is_success_class, reason_phrase};
use crate::lookup::EXCEPTIONS_PATH;

/// Left margin of every line after the first.
pub const INDENT: &str = "               ";

const LEVEL_PAD: usize = 5;
const MAX_SECTION_LEN: usize = 3;
const NESTING: &str = "  ";
const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Formats records for the developer console.
///
/// Holds only immutable settings and a handle to the shared registry, so a
/// single formatter can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct DevFormatter {
    config: FormatterConfig,
    registry: Arc<ExceptionRegistry>,
    support: ColorSupport,
    renderer: MessageRenderer,
}

impl DevFormatter {
    #[must_use]
    pub fn new(config: FormatterConfig, registry: Arc<ExceptionRegistry>) -> Self {
        let support = config.resolve_color_support();
        Self {
            config,
            registry,
            support,
            renderer: MessageRenderer::new(support),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ExceptionRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn color_support(&self) -> ColorSupport {
        self.support
    }

    /// Format one record. An empty string means the record is suppressed.
    #[must_use]
    pub fn format(&self, record: &LogRecord) -> String {
        if record.logger_name == self.config.access_log_logger {
            self.format_http(record)
        } else {
            self.format_general(record)
        }
    }

    /// Access-log rendering, falling back to [`format_general`] when the
    /// message is not an access-log line.
    ///
    /// [`format_general`]: Self::format_general
    #[must_use]
    pub fn format_http(&self, record: &LogRecord) -> String {
        let Some(entry) = AccessLogEntry::parse(&record.message) else {
            trace!(
                target: targets::FORMATTER,
                "access log line did not parse, using general format"
            );
            return self.format_general(record);
        };

        // Requests for lookup pages would otherwise log themselves.
        if entry.request.target.starts_with(EXCEPTIONS_PATH) {
            return String::new();
        }

        let code = entry.status_code();
        let status_color = if is_success_class(code) {
            level_color(Level::Info)
        } else {
            level_color(Level::Error)
        };

        let mut out = self.http_message_line(record, &entry, status_color);
        out.push('\n');
        out.push_str(&self.http_context_line(&entry, code, status_color));
        out.push('\n');
        out.push_str(&self.context_line(record));
        out.push_str("\n\n");
        out
    }

    /// Message line, context line, and exception block.
    #[must_use]
    pub fn format_general(&self, record: &LogRecord) -> String {
        let mut out = self.message_line(record);
        out.push('\n');

        let context = self.context_line(record);
        if !context.trim().is_empty() {
            out.push_str(&context);
            out.push('\n');
        }

        if let Some(exception) = &record.exception {
            out.push_str(&self.exception_block(exception));
            out.push('\n');
        }

        out.push('\n');
        out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        self.support.colorize(text, color)
    }

    fn timestamp(&self, record: &LogRecord) -> String {
        let local = record.timestamp.with_timezone(&Local);
        self.paint(&local.format(TIMESTAMP_FORMAT).to_string(), LO_TEXT)
    }

    fn message_line(&self, record: &LogRecord) -> String {
        let message = self
            .renderer
            .render(&record.message, record.style, record.args.as_deref());
        let line = format!(
            "{} {} {}",
            self.timestamp(record),
            self.paint(&pad_level(record.level.as_str()), level_color(record.level)),
            message
        );
        wrap(&line, self.config.wrap_width, &format!("{INDENT}{NESTING}"))
    }

    fn http_message_line(
        &self,
        record: &LogRecord,
        entry: &AccessLogEntry<'_>,
        status_color: Color,
    ) -> String {
        format!(
            "{} {} {} {} {}",
            self.timestamp(record),
            self.paint(&pad_level("HTTP"), LO_TEXT),
            self.paint(entry.request.method, status_color),
            self.paint(entry.request.target, HI_TEXT),
            self.paint(entry.request.protocol, LO_TEXT),
        )
    }

    fn http_context_line(
        &self,
        entry: &AccessLogEntry<'_>,
        code: u16,
        status_color: Color,
    ) -> String {
        format!(
            "{INDENT}{}{} {}{} {}{}{}",
            self.paint("|", DELIM),
            self.paint(&code.to_string(), status_color),
            self.paint(reason_phrase(code), status_color.darken(0.15)),
            self.paint("|", DELIM),
            self.paint("<", DELIM),
            self.paint(entry.subject(), HTTP_CTX_IMPORTANT),
            self.paint(">", DELIM),
        )
    }

    /// `[logger] (thread)`, plus `<trace:..,span:..>` when enabled.
    fn context_line(&self, record: &LogRecord) -> String {
        let mut line = format!(
            "{INDENT}{}{}{} {}{}{}",
            self.paint("[", DELIM),
            self.paint(&shorten_logger_name(&record.logger_name), CTX_TERTIARY),
            self.paint("]", DELIM),
            self.paint("(", DELIM),
            self.paint(&record.thread_name, CTX_SECONDARY),
            self.paint(")", DELIM),
        );

        if self.config.show_trace_context {
            let trace_id = record.metadata_value(TRACE_ID_KEY).unwrap_or("none");
            let span_id = record.metadata_value(SPAN_ID_KEY).unwrap_or("none");
            line.push(' ');
            line.push_str(&self.paint("<", DELIM));
            line.push_str(&self.paint("trace:", LO_TEXT));
            line.push_str(&self.paint(trace_id, CTX_PRIMARY));
            line.push_str(&self.paint(",", DELIM));
            line.push_str(&self.paint("span:", LO_TEXT));
            line.push_str(&self.paint(span_id, CTX_PRIMARY));
            line.push_str(&self.paint(">", DELIM));
        }

        line
    }

    /// Every node of the chain, then the lookup link for the head.
    fn exception_block(&self, exception: &Arc<ExceptionInfo>) -> String {
        let mut block = exception
            .chain()
            .enumerate()
            .map(|(depth, node)| self.exception_fragment(node, depth + 1))
            .collect::<Vec<_>>()
            .join("\n");

        let id = self.registry.register(Arc::clone(exception));
        let link = format!("{}{EXCEPTIONS_PATH}{id}", self.config.base_url());
        block.push('\n');
        block.push_str(INDENT);
        block.push_str(&bold(&self.paint(&link, EXC_QUATERNARY)));
        block
    }

    /// One chain node at `depth` (1 for the head): marker and wrapped
    /// message, then its type and top frame.
    fn exception_fragment(&self, node: &ExceptionInfo, depth: usize) -> String {
        let nesting = NESTING.repeat(depth - 1);
        let level_indent = format!("{INDENT}{nesting}{NESTING}");
        let marked = format!(
            "{INDENT}{nesting}{}{}",
            self.paint("↪ ", EXC_PRIMARY),
            self.paint(&node.message, EXC_MESSAGE)
        );
        let message = wrap(&marked, self.config.wrap_width, &format!("{level_indent}{NESTING}"));

        let mut context = self.paint(node.simple_type_name(), EXC_PRIMARY);
        if let Some(frame) = node.top_frame() {
            let location = if frame.method.is_empty() {
                frame.simple_type_name().to_string()
            } else {
                format!("{}.{}", frame.simple_type_name(), frame.method)
            };
            context.push(' ');
            context.push_str(&self.paint(&location, EXC_SECONDARY));
            context.push_str(&self.paint("(", DELIM));
            context.push_str(&self.paint(&frame.file, EXC_TERTIARY));
            context.push_str(&self.paint(":", DELIM));
            context.push_str(&self.paint(&frame.line.to_string(), EXC_TERTIARY));
            context.push_str(&self.paint(")", DELIM));
        }

        format!("{message}\n{level_indent}{context}")
    }
}

/// Right-pad a level name to five columns.
#[must_use]
pub fn pad_level(name: &str) -> String {
    format!("{name:<LEVEL_PAD$}")
}

/// Abbreviate every logger path segment but the last to three characters.
///
/// Segments are split on `::` when present, otherwise on `.`:
/// `io.quarkus.http.access-log` becomes `io.qua.htt.access-log`.
#[must_use]
pub fn shorten_logger_name(name: &str) -> String {
    let delimiter = if name.contains("::") { "::" } else { "." };
    let mut sections: Vec<&str> = name.split(delimiter).collect();
    let Some(last) = sections.pop() else {
        return String::new();
    };
    if sections.is_empty() {
        return last.to_string();
    }

    let mut shortened = sections
        .iter()
        .map(|section| section.chars().take(MAX_SECTION_LEN).collect::<String>())
        .collect::<Vec<_>>()
        .join(delimiter);
    shortened.push_str(delimiter);
    shortened.push_str(last);
    shortened
}
