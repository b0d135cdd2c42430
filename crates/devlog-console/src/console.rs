//! Console writer for formatted blocks

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use devlog_core::logging::{targets, warn};

use crate::detection::DisplayContext;

type Sink = Box<dyn Write + Send>;

/// Thread-safe destination for formatted records (stderr by default)
pub struct DevConsole {
    sink: Mutex<Sink>,
    context: DisplayContext,
}

impl DevConsole {
    /// Create with automatic detection
    #[must_use]
    pub fn new() -> Self {
        Self::with_context(DisplayContext::detect())
    }

    /// Create writing to stderr in the given context
    #[must_use]
    pub fn with_context(context: DisplayContext) -> Self {
        Self::with_writer(io::stderr(), context)
    }

    /// Create with custom writer (for testing)
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(writer: W, context: DisplayContext) -> Self {
        Self {
            sink: Mutex::new(Box::new(writer)),
            context,
        }
    }

    // ─────────────────────────────────────────────────
    // State Queries
    // ─────────────────────────────────────────────────

    /// Check if escape sequences are passed through
    #[must_use]
    pub fn is_rich(&self) -> bool {
        self.context.is_human()
    }

    #[must_use]
    pub fn context(&self) -> DisplayContext {
        self.context
    }

    // ─────────────────────────────────────────────────
    // Output Methods
    // ─────────────────────────────────────────────────

    /// Write one formatted block verbatim, or stripped of escape sequences
    /// in plain mode. An empty block writes nothing.
    pub fn write_block(&self, block: &str) {
        if block.is_empty() {
            return;
        }
        let stripped;
        let bytes = if self.is_rich() {
            block.as_bytes()
        } else {
            stripped = strip_ansi_escapes::strip(block);
            stripped.as_slice()
        };

        let result = {
            let mut sink = self.lock();
            sink.write_all(bytes).and_then(|()| sink.flush())
        };
        // Reported after the sink is released; loggers skip this target.
        if let Err(err) = result {
            warn!(target: targets::CONSOLE, "console write failed: {err}");
        }
    }

    pub fn flush(&self) {
        let _ = self.lock().flush();
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DevConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DevConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevConsole")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────
// Global Console Accessor
// ─────────────────────────────────────────────────────────

static CONSOLE: OnceLock<DevConsole> = OnceLock::new();

/// Get the global console instance
#[must_use]
pub fn console() -> &'static DevConsole {
    CONSOLE.get_or_init(DevConsole::new)
}

/// Initialize the global console with a specific context
/// Must be called before any output; returns error if already initialized
pub fn init_console(context: DisplayContext) -> Result<(), &'static str> {
    CONSOLE
        .set(DevConsole::with_context(context))
        .map_err(|_| "Console already initialized")
}

/// The global console, or one owned by a logger.
#[derive(Debug, Clone, Default)]
pub(crate) enum ConsoleHandle {
    #[default]
    Global,
    Owned(Arc<DevConsole>),
}

impl ConsoleHandle {
    pub(crate) fn get(&self) -> &DevConsole {
        match self {
            Self::Global => console(),
            Self::Owned(console) => console,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const BLOCK: &str = "\u{1b}[38;5;196mred\u{1b}[39m text\n\n";

    #[test]
    fn test_rich_writes_verbatim() {
        let out = Shared::default();
        let console = DevConsole::with_writer(out.clone(), DisplayContext::Human);
        console.write_block(BLOCK);
        assert!(console.is_rich());
        assert_eq!(out.text(), BLOCK);
    }

    #[test]
    fn test_failed_write_is_reported_not_raised() {
        let console = DevConsole::with_writer(Broken, DisplayContext::Human);
        console.write_block(BLOCK);
        console.write_block(BLOCK);
    }

    #[test]
    fn test_plain_strips_escapes() {
        let out = Shared::default();
        let console = DevConsole::with_writer(out.clone(), DisplayContext::Agent);
        console.write_block(BLOCK);
        assert!(!console.is_rich());
        assert_eq!(out.text(), "red text\n\n");
    }

    #[test]
    fn test_empty_block_writes_nothing() {
        let out = Shared::default();
        let console = DevConsole::with_writer(out.clone(), DisplayContext::Human);
        console.write_block("");
        assert!(out.text().is_empty());
    }

    #[test]
    fn test_debug_shows_context() {
        let console = DevConsole::with_writer(io::sink(), DisplayContext::Agent);
        assert!(format!("{console:?}").contains("Agent"));
    }
}
