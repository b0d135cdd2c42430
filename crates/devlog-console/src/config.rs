//! Formatter configuration.
//!
//! `FormatterConfig` is read once when a [`DevFormatter`](crate::DevFormatter)
//! is built. It can be assembled programmatically, from environment
//! variables, or from a TOML document.

use std::env;

use devlog_core::ColorSupport;
use serde::Deserialize;
use thiserror::Error;

/// Default logger name of HTTP access-log records.
pub const DEFAULT_ACCESS_LOG_LOGGER: &str = "http.access-log";

/// Default wrap column.
pub const DEFAULT_WRAP_WIDTH: usize = 160;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid devlog configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Color capability as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Detect from `COLORTERM`.
    Auto,
    TrueColor,
    Ansi256,
}

/// Settings consumed by the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Host used in exception lookup links.
    pub http_host: String,
    /// Port used in exception lookup links.
    pub http_port: u16,
    /// Show `<trace:..,span:..>` on context lines.
    pub show_trace_context: bool,
    /// Column at which message lines wrap.
    pub wrap_width: usize,
    /// Logger name that marks HTTP access-log records.
    pub access_log_logger: String,
    #[serde(skip)]
    pub color_support: Option<ColorSupport>,
    #[serde(rename = "color")]
    color_setting: Option<ColorSetting>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            http_host: "localhost".to_string(),
            http_port: 8080,
            show_trace_context: false,
            wrap_width: DEFAULT_WRAP_WIDTH,
            access_log_logger: DEFAULT_ACCESS_LOG_LOGGER.to_string(),
            color_support: None,
            color_setting: None,
        }
    }
}

impl FormatterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `DEVLOG_HTTP_HOST` | host | Host in lookup links |
    /// | `DEVLOG_HTTP_PORT` | port | Port in lookup links |
    /// | `DEVLOG_SHOW_TRACE_CONTEXT` | 0/1/true/false | Trace/span display |
    /// | `DEVLOG_WRAP_WIDTH` | columns | Wrap column |
    /// | `DEVLOG_ACCESS_LOG` | logger name | Access-log logger |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("DEVLOG_HTTP_HOST") {
            config.http_host = host;
        }
        if let Ok(port) = env::var("DEVLOG_HTTP_PORT") {
            config.http_port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DEVLOG_HTTP_PORT",
                value: port,
            })?;
        }
        if let Ok(show) = env::var("DEVLOG_SHOW_TRACE_CONTEXT") {
            config.show_trace_context = parse_flag(&show).ok_or(ConfigError::InvalidValue {
                key: "DEVLOG_SHOW_TRACE_CONTEXT",
                value: show,
            })?;
        }
        if let Ok(width) = env::var("DEVLOG_WRAP_WIDTH") {
            config.wrap_width = width
                .trim()
                .parse()
                .ok()
                .filter(|w| *w > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "DEVLOG_WRAP_WIDTH",
                    value: width,
                })?;
        }
        if let Ok(logger) = env::var("DEVLOG_ACCESS_LOG") {
            config.access_log_logger = logger;
        }

        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// ```toml
    /// http_host = "0.0.0.0"
    /// http_port = 9000
    /// show_trace_context = true
    /// color = "truecolor"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(source)?;
        if config.wrap_width == 0 {
            return Err(ConfigError::InvalidValue {
                key: "wrap_width",
                value: "0".to_string(),
            });
        }
        config.color_support = match config.color_setting {
            Some(ColorSetting::TrueColor) => Some(ColorSupport::TrueColor),
            Some(ColorSetting::Ansi256) => Some(ColorSupport::Ansi256),
            Some(ColorSetting::Auto) | None => None,
        };
        Ok(config)
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    #[must_use]
    pub fn with_http_host(mut self, host: impl Into<String>) -> Self {
        self.http_host = host.into();
        self
    }

    #[must_use]
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    #[must_use]
    pub fn with_trace_context(mut self, show: bool) -> Self {
        self.show_trace_context = show;
        self
    }

    #[must_use]
    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width.max(1);
        self
    }

    #[must_use]
    pub fn with_access_log_logger(mut self, logger: impl Into<String>) -> Self {
        self.access_log_logger = logger.into();
        self
    }

    /// Pin the color capability instead of detecting it.
    #[must_use]
    pub fn with_color_support(mut self, support: ColorSupport) -> Self {
        self.color_support = Some(support);
        self
    }

    // ─────────────────────────────────────────────────
    // Resolution Methods
    // ─────────────────────────────────────────────────

    /// Configured capability, or the process-wide detected one.
    #[must_use]
    pub fn resolve_color_support(&self) -> ColorSupport {
        self.color_support.unwrap_or_else(ColorSupport::detect)
    }

    /// Base URL for exception lookup links, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.http_host, self.http_port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
