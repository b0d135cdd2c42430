//! Logging about devlog itself.
//!
//! devlog reports its own diagnostics through the [`log`] facade. These
//! records never carry exceptions, so rendering them cannot re-enter the
//! exception registry.
//!
//! Example filter: `RUST_LOG=devlog::registry=trace`

// Re-export log macros for ergonomic use
pub use log::{debug, error, info, trace, warn};

/// Log targets used by devlog components.
pub mod targets {
    /// Root target for all devlog logs.
    pub const DEVLOG: &str = "devlog";

    /// Exception registry insertions and evictions.
    pub const REGISTRY: &str = "devlog::registry";

    /// Record formatting decisions (e.g. access-log fallback).
    pub const FORMATTER: &str = "devlog::formatter";

    /// Console output.
    pub const CONSOLE: &str = "devlog::console";
}
