//! Exception detail pages behind the lookup links.
//!
//! Formatted records end with `http://host:port/q/exceptions/<id>`. An HTTP
//! server routes that path here; this module resolves the identifier against
//! the registry and renders the page. Serving it is left to the host
//! application, which receives a ready `http::Response`.

use devlog_core::logging::{debug, targets};
use devlog_core::{ExceptionInfo, ExceptionRegistry};
use http::{Response, StatusCode, header};

/// Path prefix of lookup links, including both slashes.
pub const EXCEPTIONS_PATH: &str = "/q/exceptions/";

/// Identifier addressed by a request path, if the path is a lookup link.
#[must_use]
pub fn exception_id_from_path(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.strip_prefix(EXCEPTIONS_PATH)
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Found { body: String },
    NotFound,
}

impl LookupResponse {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// `200 text/html` with the page, or an empty `404`.
    #[must_use]
    pub fn into_http(self) -> Response<String> {
        match self {
            Self::Found { body } => {
                let mut response = Response::new(body);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("text/html"),
                );
                response
            }
            Self::NotFound => {
                let mut response = Response::new(String::new());
                *response.status_mut() = StatusCode::NOT_FOUND;
                response
            }
        }
    }
}

/// Resolve `id` and render its detail page.
#[must_use]
pub fn lookup(registry: &ExceptionRegistry, id: &str) -> LookupResponse {
    match registry.lookup(id) {
        Some(exception) => LookupResponse::Found {
            body: render_page(&exception),
        },
        None => {
            debug!(target: targets::REGISTRY, "no exception registered under {id}");
            LookupResponse::NotFound
        }
    }
}

/// Full HTML page for one exception chain.
#[must_use]
pub fn render_page(exception: &ExceptionInfo) -> String {
    let trace = exception.to_string();
    let mut page = String::with_capacity(PAGE_HEAD.len() + trace.len() + PAGE_TAIL.len());
    page.push_str(&PAGE_HEAD.replace("{{NAME}}", &escape_html(&exception.type_name)));
    page.push_str(&escape_html(&trace));
    page.push_str(PAGE_TAIL);
    page
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
    <title>Exception Detail</title>
    <meta charset="utf-8">
    <style>
html, body {
    margin: 0;
    padding: 0;
    font-family: 'Open Sans', Helvetica, Arial, sans-serif;
    font-size: 100%;
    font-weight: 100;
    line-height: 1.4;
}
html {
    overflow-y: scroll;
}
body {
    background: #f9f9f9;
}
.container {
    width: 80%;
    margin: 0 auto;
}
.content {
    padding: 1em 0 1em 0;
}
header {
    background-color: #ad1c1c;
}
.exception-message {
    background: #be2828;
}
h1, h2 {
    margin: 0;
    padding: 0;
}
h1 {
    font-size: 2rem;
    color: #fff;
    line-height: 3.75rem;
    font-weight: 700;
    padding: 0.4rem 0rem 0.4rem 0rem;
}
h2 {
    font-size: 1.2rem;
    color: rgba(255, 255, 255, 0.85);
    line-height: 2.5rem;
    font-weight: 400;
    padding: 0.4rem 0rem 0.4rem 0rem;
}
pre {
    white-space: pre;
    font-family: Consolas, Monaco, Menlo, "Ubuntu Mono", "Liberation Mono", monospace;
    font-size: 12px;
    line-height: 1.5;
    color: #555;
    overflow-x: scroll;
    border: thin solid black;
    border-radius: 3px;
    padding: 10px;
    padding-bottom: 20px;
}
</style>
</head>
<body>
<header>
    <h1 class="container">Exception Detail</h1>
    <div class="exception-message">
        <h2 class="container">{{NAME}}</h2>
    </div>
</header>
<div class="container content">
<pre>
"#;

const PAGE_TAIL: &str = "</pre>\n</div>\n</body>\n</html>\n";
