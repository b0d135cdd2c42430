//! Exception chains attached to log records.
//!
//! An [`ExceptionInfo`] is one node of a singly-linked cause chain. Chains are
//! shared through `Arc` so the registry can keep a chain alive after the log
//! record that carried it is gone.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// One call-frame of an exception's stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackFrame {
    /// Fully qualified declaring type or module (`a.b.Type` or `a::b::module`).
    pub declaring_type: String,
    /// Method or function name. May be empty when unknown.
    pub method: String,
    pub file: String,
    pub line: u32,
}

impl StackFrame {
    #[must_use]
    pub fn new(
        declaring_type: impl Into<String>,
        method: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method: method.into(),
            file: file.into(),
            line,
        }
    }

    /// Last segment of the declaring type, split on `.` or `::`.
    #[must_use]
    pub fn simple_type_name(&self) -> &str {
        simple_name(&self.declaring_type)
    }

    /// Hash of the frame contents. Stable across processes.
    #[must_use]
    pub fn shape_hash(&self) -> u32 {
        let mut h = string_hash(&self.declaring_type);
        h = h.wrapping_mul(31).wrapping_add(string_hash(&self.method));
        h = h.wrapping_mul(31).wrapping_add(string_hash(&self.file));
        h.wrapping_mul(31).wrapping_add(self.line)
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.method.is_empty() {
            write!(f, "{}({}:{})", self.declaring_type, self.file, self.line)
        } else {
            write!(
                f,
                "{}.{}({}:{})",
                self.declaring_type, self.method, self.file, self.line
            )
        }
    }
}

/// A node in an exception cause chain.
#[derive(Debug, Clone)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    pub frames: Vec<StackFrame>,
    pub cause: Option<Arc<ExceptionInfo>>,
}

impl ExceptionInfo {
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    #[must_use]
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = StackFrame>) -> Self {
        self.frames.extend(frames);
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Arc<ExceptionInfo>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Build a chain from a Rust error by walking [`Error::source`].
    ///
    /// The head takes its name from `E`; causes are named from their `Debug`
    /// representation. None of the nodes carry frames.
    #[must_use]
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let mut head = Self::new(simple_name(std::any::type_name::<E>()), error.to_string());
        head.cause = source_chain(error);
        head
    }

    /// Build a chain from a type-erased error.
    #[must_use]
    pub fn from_dyn_error(error: &(dyn Error + 'static)) -> Self {
        let mut node = Self::new(debug_type_name(error), error.to_string());
        node.cause = source_chain(error);
        node
    }

    /// Topmost frame, if any.
    #[must_use]
    pub fn top_frame(&self) -> Option<&StackFrame> {
        self.frames.first()
    }

    /// Last segment of the type name.
    #[must_use]
    pub fn simple_type_name(&self) -> &str {
        simple_name(&self.type_name)
    }

    /// The next node in the chain, unless it is this node itself.
    #[must_use]
    pub fn next_cause(&self) -> Option<&ExceptionInfo> {
        self.cause
            .as_deref()
            .filter(|cause| !std::ptr::eq(*cause, self))
    }

    /// Iterate the chain starting at this node.
    pub fn chain(&self) -> impl Iterator<Item = &ExceptionInfo> {
        std::iter::successors(Some(self), |node| node.next_cause())
    }
}

impl fmt::Display for ExceptionInfo {
    /// Full trace: head line, frames, then `Caused by:` sections.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, node) in self.chain().enumerate() {
            if depth > 0 {
                f.write_str("Caused by: ")?;
            }
            if node.message.is_empty() {
                writeln!(f, "{}", node.type_name)?;
            } else {
                writeln!(f, "{}: {}", node.type_name, node.message)?;
            }
            for frame in &node.frames {
                writeln!(f, "\tat {frame}")?;
            }
        }
        Ok(())
    }
}

fn simple_name(qualified: &str) -> &str {
    let start = qualified
        .rfind("::")
        .map(|i| i + 2)
        .into_iter()
        .chain(qualified.rfind('.').map(|i| i + 1))
        .max()
        .unwrap_or(0);
    &qualified[start..]
}

/// Longest `source()` walk converted into a chain.
const MAX_SOURCE_DEPTH: usize = 64;

/// Causes below `error`, in order.
///
/// The walk stops at an error that names itself as its source. Longer cycles
/// are cut at [`MAX_SOURCE_DEPTH`] nodes, head included.
fn source_chain(error: &(dyn Error + 'static)) -> Option<Arc<ExceptionInfo>> {
    let mut causes = Vec::new();
    let mut current = error;
    while let Some(source) = current.source() {
        if std::ptr::addr_eq(source, current) || causes.len() + 1 >= MAX_SOURCE_DEPTH {
            break;
        }
        causes.push(ExceptionInfo::new(debug_type_name(source), source.to_string()));
        current = source;
    }
    causes.into_iter().rev().fold(None, |next, mut node| {
        node.cause = next;
        Some(Arc::new(node))
    })
}

/// Leading identifier of the `Debug` output, or `Error`.
fn debug_type_name(error: &dyn Error) -> String {
    let debug = format!("{error:?}");
    let ident: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if ident.chars().next().is_some_and(char::is_alphabetic) {
        ident
    } else {
        "Error".to_string()
    }
}

fn string_hash(s: &str) -> u32 {
    s.chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}
