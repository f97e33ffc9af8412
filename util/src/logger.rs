//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::Utc;
use colored::{ColoredString, Colorize};
use log::{self, info};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::time;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// Records are written to stdout and, if `log_file_path` is given, to that
/// file. Each record is stamped with the number of seconds since the logger
/// was initialised.
///
/// # Notes
/// 
/// - `min_level` must be greater than `log::Level::Info`.
/// 
/// # Safety
/// 
/// - This function must only be called once, subsequent calls return
///   `LoggerInitError::FernInitError`.
pub fn logger_init(
    min_level: self::LevelFilter, 
    log_file_path: Option<&Path>
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let epoch = Utc::now();

    // Setup the logger using fern's builder pattern
    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            let elapsed_s = time::duration_to_seconds(Utc::now() - epoch)
                .unwrap_or(std::f64::NAN);

            // If debug or trace include the target, otherwise don't include it
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    elapsed_s,
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    elapsed_s,
                    level_to_str(record.level()),
                    message
                ))
            }

        })
        .level(min_level)
        .chain(std::io::stdout());

    if let Some(path) = log_file_path {
        dispatch = dispatch.chain(match fern::log_file(path) {
            Ok(f) => f,
            Err(e) => return Err(LoggerInitError::LogFileInitError(e))
        });
    }

    match dispatch.apply() {
        Ok(_) => (),
        Err(e) => return Err(LoggerInitError::FernInitError(e))
    };
    
    info!("Logging initialised");
    info!("    Log epoch: {}", epoch);
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_logger_init() {
        assert!(matches!(
            logger_init(LevelFilter::Warn, None),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));

        assert!(logger_init(LevelFilter::Trace, None).is_ok());

        // The global logger can only be set once
        assert!(matches!(
            logger_init(LevelFilter::Debug, None),
            Err(LoggerInitError::FernInitError(_))
        ));
    }
}
