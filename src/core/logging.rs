//! Logger initialization
//!
//! The crate itself only emits through the `log` facade. Applications
//! embedding it call [`init_logging`] once at startup to route that output
//! through flexi_logger, with text, colored-text or JSON formatting and
//! optional file output.

use std::sync::{Mutex, OnceLock};

// Keeps the flexi_logger handle alive for the life of the process.
static LOGGER_HANDLE: OnceLock<Mutex<flexi_logger::LoggerHandle>> = OnceLock::new();

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialize process-wide logging.
///
/// `level` is a flexi_logger level spec (e.g. `"info"` or
/// `"debug, lapin=warn"`). When `log_file` is given, records go to that file
/// instead of stderr. Colored output only applies to the text format.
pub fn init_logging(
    level: &str,
    format: LogFormat,
    log_file: Option<&std::path::Path>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let mut logger = Logger::try_with_str(level)?;

    logger = match (format, color_enabled) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Text, true) => logger.format(color_format),
        (LogFormat::Text, false) => logger.format(text_format),
    };

    if let Some(path) = log_file {
        logger = logger.log_to_file(FileSpec::try_from(path)?);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));

    Ok(())
}

fn level_abbreviation(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

// Convert taskrelay::tasks::broker_queue -> tasks/broker_queue.rs:42
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = if let Some(without_prefix) = target.strip_prefix("taskrelay::") {
        without_prefix.replace("::", "/") + ".rs"
    } else {
        target.replace("::", "/")
    };

    if let Some(line_num) = line {
        format!("{}:{}", path_like, line_num)
    } else {
        path_like
    }
}

// Format: "YYYY-MM-DD HH:mm:ss.fff INF message (tasks/broker_queue.rs:42)"
fn text_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbreviation(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbreviation(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log record\"}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_target_formatting_strips_crate_prefix() {
        let formatted = format_target_as_path("taskrelay::tasks::broker_queue", Some(42));
        assert_eq!(formatted, "tasks/broker_queue.rs:42");

        let external = format_target_as_path("lapin::channel", None);
        assert_eq!(external, "lapin/channel");
    }

    #[test]
    fn test_text_format_output_structure() {
        let mut buffer = Vec::new();
        let mut now = flexi_logger::DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Warn)
            .target("taskrelay::logs::reader")
            .args(format_args!("Test message"))
            .build();

        text_format(&mut buffer, &mut now, &record).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("WRN Test message"));
        assert!(output.contains("(logs/reader.rs"));
    }

    #[test]
    fn test_json_format_output_is_valid_json() {
        let mut buffer = Vec::new();
        let mut now = flexi_logger::DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Info)
            .target("taskrelay::broker::queue")
            .args(format_args!("Command published: resize_image"))
            .build();

        json_format(&mut buffer, &mut now, &record).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["level"], "INF");
        assert_eq!(parsed["message"], "Command published: resize_image");
    }

    #[test]
    #[serial]
    fn test_init_logging_starts_once() {
        // A second initialization attempt in the same process fails inside
        // the log facade; only the first call may claim the global logger.
        let first = init_logging("debug", LogFormat::Text, None, false);
        if first.is_ok() {
            log::debug!("logging initialised for tests");
        }
    }
}
