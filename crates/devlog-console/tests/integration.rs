//! End-to-end formatting scenarios, asserted on escape-stripped output.

use std::sync::Arc;
use std::thread;

use chrono::{Local, TimeZone, Utc};
use devlog_console::logging::DevLogger;
use devlog_console::testing::TestConsole;
use devlog_console::{
    DevFormatter, ExceptionInfo, ExceptionRegistry, FormatterConfig, Level, LogRecord,
    LookupResponse, StackFrame, exception_id_from_path, lookup,
};
use devlog_core::{Arg, ColorSupport, FormatStyle, exception_id, visible_width};

const TRACE_ID: &str = "51793732132590713";
const SPAN_ID: &str = "1497135987135289";
const WRAP_INDENT: &str = "                 ";

fn strip(s: &str) -> String {
    strip_ansi_escapes::strip_str(s)
}

fn formatter(config: FormatterConfig) -> DevFormatter {
    DevFormatter::new(
        config.with_color_support(ColorSupport::TrueColor),
        Arc::new(ExceptionRegistry::new()),
    )
}

fn at_12_34_56() -> chrono::DateTime<Utc> {
    Local
        .with_ymd_and_hms(2001, 1, 1, 12, 34, 56)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

fn record(level: Level, message: &str) -> LogRecord {
    LogRecord::new(level, message)
        .with_timestamp(at_12_34_56())
        .with_logger("io.quarkus")
        .with_thread("Quarkus Main")
}

fn frame(method: &str, line: u32) -> StackFrame {
    StackFrame::new(
        "io.quarkiverse.logging.dev.test.TestExceptions",
        method,
        "TestExceptions.java",
        line,
    )
}

fn exception_chain() -> Arc<ExceptionInfo> {
    let not_found = ExceptionInfo::new(
        "java.io.FileNotFoundException",
        "File not found\nmore details on a newline.",
    )
    .with_frame(frame("getEx3", 17));
    let io = ExceptionInfo::new(
        "java.io.IOException",
        "Could not read from file\nmore details on a newline.",
    )
    .with_frame(frame("getEx2", 13))
    .with_cause(not_found);
    Arc::new(
        ExceptionInfo::new(
            "java.lang.RuntimeException",
            "Something bad happened. Here are more details",
        )
        .with_frame(frame("getEx1", 9))
        .with_cause(io),
    )
}

fn access_log(line: &str) -> LogRecord {
    record(Level::Info, line)
        .with_logger("http.access-log")
        .with_thread("vert.x-eventloop-thread-0")
}

#[test]
fn full_record_with_trace_context_and_chain() {
    let f = formatter(FormatterConfig::new().with_trace_context(true));
    let chain = exception_chain();
    let rec = record(Level::Error, "A serious error occurred")
        .with_trace_context(TRACE_ID, SPAN_ID)
        .with_exception(Arc::clone(&chain));

    let expected = format!(
        "12:34:56 ERROR A serious error occurred\n\
         \x20              [io.quarkus] (Quarkus Main) <trace:{TRACE_ID},span:{SPAN_ID}>\n\
         \x20              ↪ Something bad happened. Here are more details\n\
         \x20                RuntimeException TestExceptions.getEx1(TestExceptions.java:9)\n\
         \x20                ↪ Could not read from file\n\
         \x20                    more details on a newline.\n\
         \x20                  IOException TestExceptions.getEx2(TestExceptions.java:13)\n\
         \x20                  ↪ File not found\n\
         \x20                      more details on a newline.\n\
         \x20                    FileNotFoundException TestExceptions.getEx3(TestExceptions.java:17)\n\
         \x20              http://localhost:8080/q/exceptions/{}\n\n",
        exception_id(&chain)
    );

    assert_eq!(strip(&f.format(&rec)), expected);
}

#[test]
fn record_without_trace_context() {
    let f = formatter(FormatterConfig::new());
    let rec = record(Level::Error, "A serious error occurred");
    assert_eq!(
        strip(&f.format(&rec)),
        "12:34:56 ERROR A serious error occurred\n               [io.quarkus] (Quarkus Main)\n\n"
    );
}

#[test]
fn trace_metadata_is_hidden_when_disabled() {
    let f = formatter(FormatterConfig::new());
    let rec = record(Level::Warn, "x").with_trace_context(TRACE_ID, SPAN_ID);
    assert!(!strip(&f.format(&rec)).contains("trace:"));
}

#[test]
fn http_access_log_record() {
    let f = formatter(FormatterConfig::new());
    let rec = access_log(
        r#"127.0.0.1 - - 01/Jan/2001:12:34:56 +0000 "GET /api/items HTTP/1.1" 200 512"#,
    );
    assert_eq!(
        strip(&f.format(&rec)),
        "12:34:56 HTTP  GET /api/items HTTP/1.1\n\
         \x20              |200 OK| <none>\n\
         \x20              [htt.access-log] (vert.x-eventloop-thread-0)\n\n"
    );
}

#[test]
fn http_unknown_status_reason() {
    let f = formatter(FormatterConfig::new());
    let rec = access_log(
        r#"10.0.0.1 - carol 01/Jan/2001:12:34:56 +0000 "DELETE /x HTTP/2" 599 0"#,
    );
    assert!(strip(&f.format(&rec)).contains("|599 Unknown| <carol>"));
}

#[test]
fn http_fallback_matches_general_format() {
    let f = formatter(FormatterConfig::new());
    for message in [
        "Started listening on 0.0.0.0:8080",
        r#"127.0.0.1 - - 01/Jan/2001:12:34:56 +0000 "not a request" 200 1"#,
        "",
    ] {
        let rec = access_log(message);
        assert_eq!(f.format_http(&rec), f.format_general(&rec));
        assert_eq!(f.format(&rec), f.format_general(&rec));
    }
}

#[test]
fn lookup_requests_are_suppressed() {
    let f = formatter(FormatterConfig::new());
    let rec = access_log(
        r#"127.0.0.1 - - 01/Jan/2001:12:34:56 +0000 "GET /q/exceptions/12345 HTTP/1.1" 200 4096"#,
    );
    assert_eq!(f.format(&rec), "");

    let tc = TestConsole::new();
    tc.console().write_block(&f.format(&rec));
    assert!(tc.raw_output_string().is_empty());
}

#[test]
fn long_message_wraps_on_delimiters() {
    let f = formatter(FormatterConfig::new());
    let features = (0..40)
        .map(|i| format!("feature-{i:02}"))
        .collect::<Vec<_>>()
        .join(", ");
    let message = format!("Installed features: [{features}]");
    let out = strip(&f.format(&record(Level::Info, &message)));
    let message_line = out.split("\n               [").next().unwrap();

    let lines: Vec<&str> = message_line.split('\n').collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with("feature-09,"));
    for line in &lines {
        assert!(visible_width(line) < 160, "line too wide: {line:?}");
    }
    for line in &lines[1..] {
        assert!(line.starts_with(WRAP_INDENT));
        assert!(!line[WRAP_INDENT.len()..].starts_with(' '));
    }
    assert_eq!(
        message_line.replace(&format!("\n{WRAP_INDENT}"), " "),
        format!("12:34:56 INFO  {message}")
    );
}

#[test]
fn token_wider_than_line_is_not_split() {
    let f = formatter(FormatterConfig::new());
    let token = "x".repeat(200);
    let out = strip(&f.format(&record(Level::Info, &format!("start {token} end"))));
    assert!(out.starts_with(&format!(
        "12:34:56 INFO  start\n{WRAP_INDENT}{token}\n{WRAP_INDENT}end\n"
    )));
}

#[test]
fn explicit_newlines_are_indented() {
    let f = formatter(FormatterConfig::new());
    let rec = record(Level::Info, "first line\nsecond line\nthird line\n");
    assert_eq!(
        strip(&f.format(&rec)),
        format!(
            "12:34:56 INFO  first line\n{WRAP_INDENT}second line\n{WRAP_INDENT}third line\n\
             \x20              [io.quarkus] (Quarkus Main)\n\n"
        )
    );
}

fn traced(rec: LogRecord) -> String {
    let f = formatter(FormatterConfig::new().with_trace_context(true));
    strip(&f.format(&rec.with_trace_context(TRACE_ID, SPAN_ID)))
}

fn traced_context_line() -> String {
    format!("               [io.quarkus] (Quarkus Main) <trace:{TRACE_ID},span:{SPAN_ID}>\n\n")
}

#[test]
fn feature_list_wraps_exactly() {
    let features = "amazon-s3, cdi, config-yaml, hibernate-validator, kotlin, kubernetes, logging-dev, \
        micrometer, mongodb-client, mongodb-panache, narayana-jta, openfga-client, opentelemetry, \
        opentelemetry-otlp-exporter, reactive-routes, rest-client-reactive, rest-client-reactive-jackson, \
        resteasy-reactive, resteasy-reactive-jackson, security, smallrye-context-propagation, \
        smallrye-fault-tolerance, smallrye-health, smallrye-jwt, smallrye-reactive-messaging, \
        smallrye-reactive-messaging-rabbitmq, vault, vertx, zanzibar, zanzibar-open-fga";
    let rec = record(Level::Info, "Installed features: [%s]")
        .with_args(FormatStyle::Printf, [Arg::from(features)]);

    let expected = "12:34:56 INFO  Installed features: [amazon-s3, cdi, config-yaml, hibernate-validator, kotlin, kubernetes, logging-dev, micrometer, mongodb-client,\n\
        \x20                mongodb-panache, narayana-jta, openfga-client, opentelemetry, opentelemetry-otlp-exporter, reactive-routes, rest-client-reactive,\n\
        \x20                rest-client-reactive-jackson, resteasy-reactive, resteasy-reactive-jackson, security, smallrye-context-propagation, smallrye-fault-tolerance,\n\
        \x20                smallrye-health, smallrye-jwt, smallrye-reactive-messaging, smallrye-reactive-messaging-rabbitmq, vault, vertx, zanzibar, zanzibar-open-fga]\n";
    assert_eq!(traced(rec), format!("{expected}{}", traced_context_line()));
}

#[test]
fn comma_joined_words_wrap_exactly() {
    let message = "Request failed with status code 400: Query validation error: 'String 'id,email,name' \
        does not match pattern. Must be a comma separated list of the following values: \
        phone_number,email,email_verified,picture,username,user_id,name,nickname,created_at,identities,\
        app_metadata,user_metadata,last_ip,last_login,logins_count,updated_at,blocked,family_name,given_name' \
        on property fields (Comma-separated list of fields to include or exclude (based on value provided \
        for include_fields) in the result. Leave empty to retrieve all fields).";

    let expected = "12:34:56 INFO  Request failed with status code 400: Query validation error: 'String 'id,email,name' does not match pattern. Must be a comma separated list of\n\
        \x20                the following values: phone_number,email,email_verified,picture,username,user_id,name,nickname,created_at,identities,app_metadata,\n\
        \x20                user_metadata,last_ip,last_login,logins_count,updated_at,blocked,family_name,given_name' on property fields (Comma-separated list of fields\n\
        \x20                to include or exclude (based on value provided for include_fields) in the result. Leave empty to retrieve all fields).\n";
    assert_eq!(
        traced(record(Level::Info, message)),
        format!("{expected}{}", traced_context_line())
    );
}

#[test]
fn paragraph_with_newlines_keeps_line_breaks_exactly() {
    let message = "Lorem ipsum dolor sit amet, consectetur adipiscing elit,\n\
        sed do eiusmod tempor incididunt ut labore et dolore magna\n\
        aliqua. Ut enim ad minim veniam, quis nostrud exercitation\n\
        ullamco laboris nisi ut aliquip ex ea commodo consequat.\n\
        Duis aute irure dolor in reprehenderit in voluptate velit\n\
        esse cillum dolore eu fugiat nulla pariatur. Excepteur sint\n\
        occaecat cupidatat non proident, sunt in culpa qui officia\n\
        deserunt mollit anim id est laborum.\n";

    let expected = "12:34:56 INFO  Lorem ipsum dolor sit amet, consectetur adipiscing elit,\n\
        \x20                sed do eiusmod tempor incididunt ut labore et dolore magna\n\
        \x20                aliqua. Ut enim ad minim veniam, quis nostrud exercitation\n\
        \x20                ullamco laboris nisi ut aliquip ex ea commodo consequat.\n\
        \x20                Duis aute irure dolor in reprehenderit in voluptate velit\n\
        \x20                esse cillum dolore eu fugiat nulla pariatur. Excepteur sint\n\
        \x20                occaecat cupidatat non proident, sunt in culpa qui officia\n\
        \x20                deserunt mollit anim id est laborum.\n";
    assert_eq!(
        traced(record(Level::Info, message)),
        format!("{expected}{}", traced_context_line())
    );
}

#[test]
fn escapes_do_not_move_wrap_points() {
    let plain = DevFormatter::new(
        FormatterConfig::new().with_color_support(ColorSupport::Ansi256),
        Arc::new(ExceptionRegistry::new()),
    );
    let rich = formatter(FormatterConfig::new());
    let message = "word ".repeat(60);
    let rec = record(Level::Debug, &message);
    assert_eq!(strip(&plain.format(&rec)), strip(&rich.format(&rec)));
}

#[test]
fn link_resolves_through_lookup() {
    let registry = Arc::new(ExceptionRegistry::new());
    let f = DevFormatter::new(
        FormatterConfig::new().with_http_port(9090),
        Arc::clone(&registry),
    );
    let out = strip(&f.format(&record(Level::Error, "boom").with_exception(exception_chain())));

    let url = out
        .lines()
        .find_map(|line| line.trim().strip_prefix("http://localhost:9090"))
        .unwrap();
    let id = exception_id_from_path(url).unwrap();

    match lookup(&registry, id) {
        LookupResponse::Found { body } => {
            assert!(body.contains("java.lang.RuntimeException"));
            assert!(body.contains("Caused by: java.io.FileNotFoundException: File not found"));
        }
        LookupResponse::NotFound => panic!("registered exception not found"),
    }
    assert_eq!(lookup(&registry, "0").into_http().status(), 404);
}

#[test]
fn evicted_exceptions_are_not_found() {
    let registry = Arc::new(ExceptionRegistry::with_capacity(2));
    let f = DevFormatter::new(FormatterConfig::new(), Arc::clone(&registry));
    let ids: Vec<String> = (1..=3)
        .map(|line| {
            let exception = ExceptionInfo::new("E", "m").with_frame(frame("run", line));
            let id = exception_id(&exception);
            let _ = f.format(&record(Level::Error, "x").with_exception(exception));
            id
        })
        .collect();

    assert!(!lookup(&registry, &ids[0]).is_found());
    assert!(lookup(&registry, &ids[1]).is_found());
    assert!(lookup(&registry, &ids[2]).is_found());
}

#[test]
fn concurrent_formatting_shares_registry() {
    let registry = Arc::new(ExceptionRegistry::new());
    let f = Arc::new(DevFormatter::new(FormatterConfig::new(), Arc::clone(&registry)));

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let f = Arc::clone(&f);
            thread::spawn(move || {
                for i in 0..50u32 {
                    let exception =
                        ExceptionInfo::new("E", "m").with_frame(frame("run", t * 100 + i));
                    let out = f.format(&record(Level::Error, "x").with_exception(exception));
                    assert!(out.contains("/q/exceptions/"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 400);
}

#[test]
fn printf_arguments_are_substituted_before_wrapping() {
    let f = formatter(FormatterConfig::new());
    let id = uuid::Uuid::new_v4();
    let rec = record(Level::Info, "session %s opened by %s after %d attempts").with_args(
        FormatStyle::Printf,
        [Arg::from(id), Arg::Str("alice".into()), Arg::from(3u32)],
    );
    assert!(strip(&f.format(&rec)).starts_with(&format!(
        "12:34:56 INFO  session {id} opened by alice after 3 attempts\n"
    )));
}

#[test]
fn logger_writes_through_test_console() {
    let tc = TestConsole::new();
    let logger = DevLogger::builder()
        .config(FormatterConfig::new().with_color_support(ColorSupport::TrueColor))
        .console(tc.console())
        .build();

    log::Log::log(
        &logger,
        &log::Record::builder()
            .args(format_args!("ready in {}ms", 42))
            .level(log::Level::Info)
            .target("app::boot")
            .build(),
    );

    tc.assert_contains("INFO  ready in 42ms");
    assert!(tc.matches(r"^\d{2}:\d{2}:\d{2} INFO  ready"));
    assert!(tc.output()[1].starts_with("               [app::boot] ("));
}
