use std::sync::OnceLock;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_LEVEL, PROGRAM_NAME};

enum LogTarget {
    Stderr,
}

pub struct Logger {
    level: Level,
    target: LogTarget,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record);
        match &self.target {
            LogTarget::Stderr => eprintln!("{line}"),
        }
    }

    fn flush(&self) {}
}

/// Render a record as `<timestamp> <LEVEL> [<target>] <message>`.
///
/// Records logged from outside this workspace keep their own target;
/// records from our crates are shortened to the program name plus module,
/// e.g. `prepare_engine::dest` becomes `prepare::dest`.
fn format_line(record: &Record<'_>) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!(
        "{} {} [{}] {}",
        timestamp,
        record.level(),
        short_target(record.target()),
        record.args()
    )
}

fn short_target(target: &str) -> String {
    let prefix = format!("{PROGRAM_NAME}_");
    match target.strip_prefix(&prefix) {
        Some(rest) => match rest.split_once("::") {
            Some((_, module)) => format!("{PROGRAM_NAME}::{module}"),
            None => PROGRAM_NAME.to_string(),
        },
        None => target.to_string(),
    }
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(get_level_from_env())
}

pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // Only the first call installs the logger, so the max level must come
    // from the logger that actually won the race, not from `level`.
    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger {
        level,
        target: LogTarget::Stderr,
    });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(logger.level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
