//! Access-log line parsing.
//!
//! Access-log records carry a common-log-format line as their message:
//!
//! ```text
//! 127.0.0.1 - alice 10/Oct/2000:13:55:36 -0700 "GET /index.html HTTP/1.1" 200 2326
//! ```

use std::sync::LazyLock;

use http::StatusCode;
use regex::Regex;

static ACCESS_LOG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"^([^ ]+) ([^ ]+) ([^ ]+) (\d{2}/\w+/\d{4}:\d{2}:\d{2}:\d{2} [+\-]?\d+) "([^"]+)" (\d+) (\d+)$"#,
    )
    .ok()
});

static REQUEST_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\w+) ([^ ]+) (HTTP/.*)$").ok());

/// One parsed access-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry<'a> {
    pub remote: &'a str,
    pub identity: &'a str,
    pub user: &'a str,
    pub timestamp: &'a str,
    pub request: RequestLine<'a>,
    pub status: &'a str,
    pub size: &'a str,
}

/// `METHOD target PROTOCOL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub protocol: &'a str,
}

impl<'a> AccessLogEntry<'a> {
    /// Parse a full line. `None` when either the line or its request part does
    /// not match.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = ACCESS_LOG.as_ref()?.captures(line)?;
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        Some(Self {
            remote: group(1),
            identity: group(2),
            user: group(3),
            timestamp: group(4),
            request: RequestLine::parse(group(5))?,
            status: group(6),
            size: group(7),
        })
    }

    /// Numeric status, `0` when it does not fit.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.parse().unwrap_or(0)
    }

    /// Authenticated subject, or `none` when absent.
    #[must_use]
    pub fn subject(&self) -> &'a str {
        let user = self.user.trim();
        if user.is_empty() || user == "-" {
            "none"
        } else {
            self.user
        }
    }
}

impl<'a> RequestLine<'a> {
    #[must_use]
    pub fn parse(request: &'a str) -> Option<Self> {
        let caps = REQUEST_LINE.as_ref()?.captures(request)?;
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        Some(Self {
            method: group(1),
            target: group(2),
            protocol: group(3),
        })
    }
}

/// Reason phrase for a status code, `Unknown` when there is none.
#[must_use]
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown")
}

/// Whether a status renders in the informational color.
#[must_use]
pub fn is_success_class(code: u16) -> bool {
    (100..400).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        r#"127.0.0.1 - alice 10/Oct/2000:13:55:36 -0700 "GET /index.html HTTP/1.1" 200 2326"#;

    #[test]
    fn parses_common_log_format() {
        let entry = AccessLogEntry::parse(LINE).unwrap();
        assert_eq!(entry.remote, "127.0.0.1");
        assert_eq!(entry.identity, "-");
        assert_eq!(entry.user, "alice");
        assert_eq!(entry.timestamp, "10/Oct/2000:13:55:36 -0700");
        assert_eq!(entry.request.method, "GET");
        assert_eq!(entry.request.target, "/index.html");
        assert_eq!(entry.request.protocol, "HTTP/1.1");
        assert_eq!(entry.status_code(), 200);
        assert_eq!(entry.size, "2326");
    }

    #[test]
    fn rejects_partial_matches() {
        assert!(AccessLogEntry::parse("not an access log").is_none());
        assert!(AccessLogEntry::parse(&format!("{LINE} trailing")).is_none());
        let bad_request =
            r#"127.0.0.1 - - 10/Oct/2000:13:55:36 -0700 "garbage" 200 1"#;
        assert!(AccessLogEntry::parse(bad_request).is_none());
    }

    #[test]
    fn subject_defaults_to_none() {
        let line = LINE.replace("alice", "-");
        assert_eq!(AccessLogEntry::parse(&line).unwrap().subject(), "none");
        assert_eq!(AccessLogEntry::parse(LINE).unwrap().subject(), "alice");
    }

    #[test]
    fn oversized_status_is_zero() {
        let line = LINE.replace(" 200 ", " 99999 ");
        assert_eq!(AccessLogEntry::parse(&line).unwrap().status_code(), 0);
    }

    #[test]
    fn reason_phrases() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(599), "Unknown");
        assert_eq!(reason_phrase(0), "Unknown");
    }

    #[test]
    fn status_classes() {
        assert!(is_success_class(100));
        assert!(is_success_class(302));
        assert!(!is_success_class(400));
        assert!(!is_success_class(0));
    }
}
