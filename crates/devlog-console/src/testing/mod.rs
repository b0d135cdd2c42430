//! Testing utilities for devlog console output
//!
//! Provides `TestConsole` for capturing and asserting on console output in tests.

mod test_console;

pub use test_console::TestConsole;
