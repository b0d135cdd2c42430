//! Plain/colored output detection
//!
//! Determines whether escape sequences should reach the output stream.

/// Display context representing the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayContext {
    /// Plain output, escape sequences stripped
    Agent,
    /// Colored output
    #[default]
    Human,
}

impl DisplayContext {
    /// Auto-detect the display context from environment
    #[must_use]
    pub fn detect() -> Self {
        if should_enable_color() {
            Self::Human
        } else {
            Self::Agent
        }
    }

    #[must_use]
    pub fn is_human(&self) -> bool {
        matches!(self, Self::Human)
    }

    #[must_use]
    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent)
    }
}

/// Determine if output is consumed by a machine or a plain terminal
#[must_use]
pub fn is_plain_context() -> bool {
    std::env::var_os("NO_COLOR").is_some()
        || std::env::var_os("DEVLOG_PLAIN").is_some()
        || std::env::var_os("CI").is_some()
}

/// Determine if colored output should be enabled
#[must_use]
pub fn should_enable_color() -> bool {
    // Explicit enable always wins
    if std::env::var_os("DEVLOG_FORCE_COLOR").is_some() {
        return true;
    }
    !is_plain_context()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_context_default_is_human() {
        let ctx = DisplayContext::default();
        assert!(ctx.is_human());
        assert!(!ctx.is_agent());
    }

    #[test]
    fn test_display_context_agent() {
        let ctx = DisplayContext::Agent;
        assert!(ctx.is_agent());
        assert!(!ctx.is_human());
    }

    #[test]
    fn test_detect_agrees_with_should_enable_color() {
        assert_eq!(DisplayContext::detect().is_human(), should_enable_color());
    }
}
