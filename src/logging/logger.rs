// file: src/logging/logger.rs
// version: 2.1.0
// guid: j0k1l2m3-n4o5-6789-0123-456789jklmno

//! Leveled logger that renders every record as `[LEVEL] message`.
//!
//! Each [`Logger`] owns its own `tracing` dispatcher, so constructing one has
//! no effect on the rest of the process. The binary opts in to sharing it with
//! [`Logger::install_global`].

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

use tracing::dispatcher::{self, Dispatch};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

use crate::error::{Result, SaltError};

/// Severity threshold accepted by [`Logger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name. Matching is case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn as_tracing_level(&self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn as_level_filter(&self) -> LevelFilter {
        LevelFilter::from_level(self.as_tracing_level())
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging capability handed to every store operation
pub trait Log: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Log for NullLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Event formatter producing `[LEVEL] message\n` and nothing else.
///
/// Level names are `DEBUG`, `INFO`, `WARNING` and `ERROR`.
///
/// Timestamps, targets, spans and structured fields other than `message` are
/// dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketFormat;

impl<S, N> FormatEvent<S, N> for BracketFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        writeln!(writer, "[{}] {}", level_label(event.metadata().level()), visitor.message)
    }
}

fn level_label(level: &Level) -> &'static str {
    if *level == Level::WARN {
        "WARNING"
    } else {
        level.as_str()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

/// Leveled logger with a fixed single-line output format
#[derive(Clone, Debug)]
pub struct Logger {
    level: LogLevel,
    dispatch: Dispatch,
}

impl Logger {
    /// Create a logger writing to stderr.
    ///
    /// Unknown level names (including the empty string) fall back to `info`
    /// and emit one warning through the new logger.
    pub fn new(level_name: &str) -> Self {
        Self::with_writer(level_name, io::stderr)
    }

    /// Create a logger writing to any `MakeWriter` sink
    pub fn with_writer<W>(level_name: &str, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let parsed = LogLevel::parse(level_name);
        let level = parsed.unwrap_or_default();

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level.as_level_filter())
            .with_ansi(false)
            .with_writer(make_writer)
            .event_format(BracketFormat)
            .finish();

        let logger = Self {
            level,
            dispatch: Dispatch::new(subscriber),
        };

        if parsed.is_none() {
            logger.warn(&format!(
                "Unknown log level '{}', defaulting to info",
                level_name
            ));
        }

        logger
    }

    /// Effective severity threshold
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Install this logger as the process-wide `tracing` default
    pub fn install_global(&self) -> Result<()> {
        dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|e| SaltError::config(format!("Failed to initialize logger: {}", e)))
    }

    fn emit(&self, level: LogLevel, message: &str) {
        dispatcher::with_default(&self.dispatch, || match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        });
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Info.as_str())
    }
}

impl Log for Logger {
    fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }
}

/// In-memory sink for [`Logger::with_writer`]; clones share one buffer
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Collected output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl io::Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MemoryWriter {
    type Writer = MemoryWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(level_name: &str) -> (Logger, MemoryWriter) {
        let sink = MemoryWriter::new();
        let logger = Logger::with_writer(level_name, sink.clone());
        (logger, sink)
    }

    #[test]
    fn test_known_levels_set_threshold() {
        // Arrange
        let cases = [
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ];

        for (name, expected) in cases {
            // Act
            let (logger, sink) = capture(name);

            // Assert
            assert_eq!(logger.level(), expected);
            assert!(sink.contents().is_empty(), "no output expected for {}", name);
        }
    }

    #[test]
    fn test_unknown_level_falls_back_to_info_with_one_warning() {
        for name in ["", "INFO", "verbose", "Debug"] {
            let (logger, sink) = capture(name);

            assert_eq!(logger.level(), LogLevel::Info);
            assert_eq!(
                sink.lines(),
                vec![format!(
                    "[WARNING] Unknown log level '{}', defaulting to info",
                    name
                )]
            );
        }
    }

    #[test]
    fn test_record_format() {
        // Arrange
        let (logger, sink) = capture("debug");

        // Act
        logger.debug("starting");
        logger.info("grains loaded");
        logger.warn("nodegroup missing");
        logger.error("agent failed");

        // Assert
        assert_eq!(
            sink.contents(),
            "[DEBUG] starting\n[INFO] grains loaded\n[WARNING] nodegroup missing\n[ERROR] agent failed\n"
        );
    }

    #[test]
    fn test_records_below_threshold_are_suppressed() {
        let (logger, sink) = capture("warn");

        logger.debug("hidden");
        logger.info("hidden");
        logger.warn("shown");
        logger.error("shown too");

        assert_eq!(sink.lines(), vec!["[WARNING] shown", "[ERROR] shown too"]);
    }

    #[test]
    fn test_message_with_braces_is_rendered_verbatim() {
        let (logger, sink) = capture("info");

        logger.info(r#"payload {"group":"a"}"#);

        assert_eq!(sink.contents(), "[INFO] payload {\"group\":\"a\"}\n");
    }

    #[test]
    fn test_loggers_are_independent() {
        let (quiet, quiet_sink) = capture("error");
        let (chatty, chatty_sink) = capture("debug");

        quiet.info("from quiet");
        chatty.info("from chatty");

        assert!(quiet_sink.contents().is_empty());
        assert_eq!(chatty_sink.lines(), vec!["[INFO] from chatty"]);
    }

    #[test]
    fn test_null_logger_accepts_everything() {
        let logger = NullLogger;
        logger.debug("a");
        logger.info("b");
        logger.warn("c");
        logger.error("d");
    }

    #[test]
    fn test_warning_label_uses_full_word() {
        // Arrange
        let (logger, sink) = capture("warn");

        // Act
        logger.warn("disk almost full");

        // Assert
        assert_eq!(sink.contents(), "[WARNING] disk almost full\n");
        assert_eq!(level_label(&Level::WARN), "WARNING");
        assert_eq!(level_label(&Level::ERROR), "ERROR");
    }

    #[test]
    fn test_level_parse_is_case_sensitive() {
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("WARN"), None);
        assert_eq!(LogLevel::parse("warning"), None);
        assert_eq!(LogLevel::Error.to_string(), "error");
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}
