//! TestConsole for capturing output in tests
//!
//! Provides a console that captures all output for assertion instead of
//! writing to stderr.

use std::io::Write;
use std::sync::{Arc, Mutex};

use strip_ansi_escapes::strip;

use crate::console::DevConsole;
use crate::detection::DisplayContext;

/// A console that captures output for testing
///
/// Hand `console()` to a logger or layer, then use `output()`,
/// `contains()`, and the assertion methods to verify what was written.
#[derive(Clone)]
pub struct TestConsole {
    inner: Arc<DevConsole>,
    buffer: Arc<Mutex<TestBuffer>>,
}

#[derive(Debug, Default)]
struct TestBuffer {
    /// Everything written, escape sequences preserved
    raw: String,
}

impl TestConsole {
    /// Create a test console that passes escape sequences through
    #[must_use]
    pub fn new() -> Self {
        Self::with_context(DisplayContext::Human)
    }

    /// Create a test console in the given display context
    #[must_use]
    pub fn with_context(context: DisplayContext) -> Self {
        let buffer = Arc::new(Mutex::new(TestBuffer::default()));
        let writer = BufferWriter(Arc::clone(&buffer));
        Self {
            inner: Arc::new(DevConsole::with_writer(writer, context)),
            buffer,
        }
    }

    /// Get the underlying console for passing to loggers
    #[must_use]
    pub fn console(&self) -> Arc<DevConsole> {
        Arc::clone(&self.inner)
    }

    /// Everything written, as written
    #[must_use]
    pub fn raw_output_string(&self) -> String {
        self.buffer
            .lock()
            .map(|b| b.raw.clone())
            .unwrap_or_default()
    }

    /// Everything written with escape sequences removed
    #[must_use]
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&strip(self.raw_output_string())).into_owned()
    }

    /// Output lines with escape sequences removed
    #[must_use]
    pub fn output(&self) -> Vec<String> {
        self.output_string().lines().map(String::from).collect()
    }

    /// Check if output contains a string (case-insensitive)
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        let output = self.output_string().to_lowercase();
        output.contains(&needle.to_lowercase())
    }

    /// Check if output contains all of the given strings
    #[must_use]
    pub fn contains_all(&self, needles: &[&str]) -> bool {
        needles.iter().all(|n| self.contains(n))
    }

    /// Check if output matches a regex pattern
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match regex::Regex::new(pattern) {
            Ok(re) => re.is_match(&self.output_string()),
            Err(_) => false,
        }
    }

    /// Assert that output contains a string
    ///
    /// # Panics
    ///
    /// Panics if the output does not contain the needle string.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "Output did not contain '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert that output does NOT contain a string
    ///
    /// # Panics
    ///
    /// Panics if the output contains the needle string.
    pub fn assert_not_contains(&self, needle: &str) {
        assert!(
            !self.contains(needle),
            "Output unexpectedly contained '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Clear the buffer
    pub fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.raw.clear();
        }
    }
}

impl Default for TestConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestConsole")
            .field("context", &self.inner.context())
            .field("line_count", &self.output().len())
            .finish()
    }
}

/// Writer that captures to a buffer
struct BufferWriter(Arc<Mutex<TestBuffer>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut buffer) = self.0.lock() {
            buffer.raw.push_str(&String::from_utf8_lossy(buf));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "\u{1b}[38;2;1;2;3mHello\u{1b}[39m World\n\n";

    #[test]
    fn test_output_capture() {
        let tc = TestConsole::new();
        tc.console().write_block(BLOCK);
        assert_eq!(tc.raw_output_string(), BLOCK);
        assert_eq!(tc.output_string(), "Hello World\n\n");
        assert_eq!(tc.output(), vec!["Hello World".to_string(), String::new()]);
    }

    #[test]
    fn test_contains_case_insensitive() {
        let tc = TestConsole::new();
        tc.console().write_block(BLOCK);
        assert!(tc.contains("hello"));
        assert!(tc.contains("WORLD"));
        assert!(tc.contains_all(&["hello", "world"]));
        assert!(!tc.contains_all(&["hello", "moon"]));
    }

    #[test]
    fn test_matches_regex() {
        let tc = TestConsole::new();
        tc.console().write_block("Error code: 42\n");
        assert!(tc.matches(r"code: \d+"));
        assert!(!tc.matches(r"code: [a-z]+"));
        assert!(!tc.matches(r"("));
    }

    #[test]
    fn test_agent_context_writes_plain() {
        let tc = TestConsole::with_context(DisplayContext::Agent);
        tc.console().write_block(BLOCK);
        assert_eq!(tc.raw_output_string(), "Hello World\n\n");
    }

    #[test]
    fn test_clear() {
        let tc = TestConsole::new();
        tc.console().write_block("Some output\n");
        assert!(!tc.output().is_empty());
        tc.clear();
        assert!(tc.output().is_empty());
        tc.assert_not_contains("Some");
    }

    #[test]
    fn test_clone_shares_buffer() {
        let tc = TestConsole::new();
        let tc2 = tc.clone();
        tc.console().write_block("Test\n");
        tc2.assert_contains("test");
    }
}
