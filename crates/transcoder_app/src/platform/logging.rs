//! Platform logging initialization for the transcoder front-end.
//!
//! By default logs go to `./transcoder.log` in the current working directory
//! so the terminal stays reserved for the status frame.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./transcoder.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum LogDestination {
    /// Write to ./transcoder.log in current directory.
    #[default]
    File,
    /// Write to terminal (stderr for warnings and errors, stdout otherwise).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Initialize the logger with the specified destination.
///
/// For `LogDestination::File` or `Both`, creates `./transcoder.log` in the
/// current working directory.
pub fn initialize(destination: LogDestination, level: LogLevel) {
    let level = LevelFilter::from(level);
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => {
            vec![TermLogger::new(
                level,
                config,
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]
        }
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Every record carries its target, so `engine` diagnostic lines stand apart
/// from the app's own messages.
fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<WriteLogger<File>>> {
    let log_path = PathBuf::from(LOG_FILE);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_logging::ENGINE_DIAG_TARGET;
    use log::{Level, Log, Record};
    use tempfile::TempDir;

    #[test]
    fn diagnostic_lines_carry_their_target() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("diag.log");
        let logger = WriteLogger::new(
            LevelFilter::Info,
            build_config(),
            File::create(&path).unwrap(),
        );

        logger.log(
            &Record::builder()
                .target(ENGINE_DIAG_TARGET)
                .level(Level::Info)
                .args(format_args!("frame=1 fps=0.0"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .target("transcoder::platform")
                .level(Level::Info)
                .args(format_args!("Preview 1 released"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .target(ENGINE_DIAG_TARGET)
                .level(Level::Warn)
                .args(format_args!("Past duration too large"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("engine: frame=1 fps=0.0"));
        assert!(lines[1].contains("transcoder::platform: Preview 1 released"));
        assert!(lines[2].contains("engine: Past duration too large"));
    }
}
