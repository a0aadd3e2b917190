//! Process wide logger backed by log4rs.
//!
//! Library code logs through the `log` macros; call [`init_logger`] once at
//! startup to choose where those records go. Calling it again swaps the
//! configuration in place.

use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const MAX_LOG_ARCHIVE_FILES: u32 = 5;
const BYTES_PER_MB: u64 = 1024 * 1024;
const MAX_ALLOWED_LOG_SIZE_IN_MB: u64 = 10;
const APPENDER: &str = "SELF_SERVICE_APPENDER";

static HANDLE: Mutex<Option<Handle>> = Mutex::new(None);

/// How record timestamps are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// Seconds since the epoch
    #[default]
    Unix,
    /// Milliseconds since the epoch
    UnixMs,
    /// Microseconds since the epoch
    UnixMicro,
}

/// Unknown names fall back to [`TimeFormat::Unix`].
impl From<&str> for TimeFormat {
    fn from(time_format: &str) -> Self {
        match time_format.to_uppercase().as_str() {
            "UNIXMS" => TimeFormat::UnixMs,
            "UNIXMICRO" => TimeFormat::UnixMicro,
            _ => TimeFormat::Unix,
        }
    }
}

impl TimeFormat {
    fn pattern(self) -> &'static str {
        match self {
            TimeFormat::Unix => "{d(%s)} {l} {t} - {m}{n}",
            TimeFormat::UnixMs => "{d(%s%3f)} {l} {t} - {m}{n}",
            TimeFormat::UnixMicro => "{d(%s%6f)} {l} {t} - {m}{n}",
        }
    }
}

/// The levels a logger can be set to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Debug and above
    Debug,
    /// Info and above
    #[default]
    Info,
    /// Warnings and errors
    Warn,
    /// Errors only
    Error,
    /// Errors only. `log` has no separate fatal level.
    Fatal,
    /// Nothing
    None,
}

/// Empty and unknown names fall back to [`LogLevel::Info`].
impl From<&str> for LogLevel {
    fn from(log_level: &str) -> Self {
        match log_level.to_uppercase().as_str() {
            "TRACE" => LogLevel::Trace,
            "DEBUG" => LogLevel::Debug,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            "NONE" => LogLevel::None,
            _ => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> LevelFilter {
        match log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Fatal => LevelFilter::Error,
            LogLevel::None => LevelFilter::Off,
        }
    }
}

/// Where records are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// Standard output
    #[default]
    Console,
    /// A size rolled file. Archives are gzipped into an `archive` directory
    /// next to it.
    File(PathBuf),
}

/// Installs the logger, or replaces the configuration of the one already
/// installed.
///
/// # Arguments
///
/// * `time_format` - How timestamps are written.
/// * `log_level` - The lowest level that is recorded.
/// * `output` - Console or file.
pub fn init_logger(
    time_format: TimeFormat,
    log_level: LogLevel,
    output: &LogOutput,
) -> Result<(), Box<dyn std::error::Error>> {
    let encoder = Box::new(PatternEncoder::new(time_format.pattern()));

    let appender: Box<dyn log4rs::append::Append> = match output {
        LogOutput::Console => Box::new(ConsoleAppender::builder().encoder(encoder).build()),
        LogOutput::File(path) => {
            let fixed_window_roller = Box::new(
                FixedWindowRoller::builder()
                    .build(&archive_pattern(path), MAX_LOG_ARCHIVE_FILES)?,
            );
            let file_size_trigger =
                Box::new(SizeTrigger::new(MAX_ALLOWED_LOG_SIZE_IN_MB * BYTES_PER_MB));
            let compound_policy =
                Box::new(CompoundPolicy::new(file_size_trigger, fixed_window_roller));

            Box::new(
                RollingFileAppender::builder()
                    .encoder(encoder)
                    .build(path, compound_policy)?,
            )
        }
    };

    let config = Config::builder()
        .appender(Appender::builder().build(APPENDER, appender))
        .build(Root::builder().appender(APPENDER).build(log_level.into()))?;

    let mut guard = HANDLE
        .lock()
        .map_err(|_| "logger handle lock poisoned")?;
    if let Some(handle) = guard.as_ref() {
        handle.set_config(config);
    } else {
        *guard = Some(log4rs::init_config(config)?);
    }

    info!("logger initialized with `{log_level:?}` log level");
    Ok(())
}

fn archive_pattern(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    path.parent()
        .unwrap_or_else(|| Path::new("."))
        .join("archive")
        .join(format!("{stem}_{{}}.gz"))
        .to_string_lossy()
        .into_owned()
}
