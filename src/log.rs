//! Initialisation of the program logger.
//!
//! Messages go to the console (colourised when writing to a terminal) and, for runs which produce
//! output, to log files in the output directory.
use anyhow::{Context, Result, anyhow, bail, ensure};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Level, LevelFilter, Metadata, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// A flag indicating whether the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `PARKPRICE_LOG_LEVEL`
/// environment variable or the settings.toml file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable which overrides the log level
const LOG_LEVEL_ENV_VAR: &str = "PARKPRICE_LOG_LEVEL";

/// The file name for the log file containing messages about the ordinary operation of the program
const LOG_INFO_FILE_NAME: &str = "parkprice_info.log";

/// The file name for the log file containing warnings and error messages
const LOG_ERROR_FILE_NAME: &str = "parkprice_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Initialise the program logger using the `fern` logging library with colourised output.
///
/// The user can specify their preferred logging level via the `settings.toml` file (defaulting to
/// `info` if not present) or with the `PARKPRICE_LOG_LEVEL` environment variable. If both are
/// provided, the environment variable takes precedence.
///
/// Possible log level options are:
///
/// * `off` (no messages at all)
/// * `error`
/// * `warn`
/// * `info`
/// * `debug`
/// * `trace`
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in `settings.toml`
/// * `log_file_path`: The location to save log files (if Some, log files will be created)
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    ensure!(!is_logger_initialised(), "Logger already initialised");

    // Retrieve the log level from the environment variable or settings
    let log_level = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| log_level_from_settings.into());
    let log_level = parse_log_level(&log_level)?;

    let mut dispatch = Dispatch::new().chain(console_dispatch(log_level));
    if let Some(log_dir) = log_file_path {
        dispatch = dispatch.chain(file_dispatch(log_dir, log_level)?);
    }

    // Apply the logger configuration
    dispatch.apply().context("Logger already initialised")?;

    // Set a flag to indicate that the logger has been initialised
    LOGGER_INIT
        .set(())
        .map_err(|()| anyhow!("Logger already initialised"))?;

    Ok(())
}

/// Messages at `warn` or above
fn is_warning_or_error(metadata: &Metadata) -> bool {
    metadata.level() <= Level::Warn
}

/// Log to stdout and stderr, with colours if writing to a terminal.
///
/// Warnings and errors go to stderr, everything else to stdout.
fn console_dispatch(log_level: LevelFilter) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let stream = |use_colour: bool| {
        Dispatch::new().format(move |out, message, record| {
            write_log_colour(out, message, record, use_colour, &colours);
        })
    };

    Dispatch::new()
        .chain(
            stream(std::io::stdout().is_terminal())
                .filter(|metadata| !is_warning_or_error(metadata))
                .level(log_level)
                .chain(std::io::stdout()),
        )
        .chain(
            stream(std::io::stderr().is_terminal())
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        )
}

/// Log to files in `log_dir`, truncating any left over from an earlier run.
///
/// The info log always records at least `info` messages, whatever the console level. Warnings and
/// errors go to a separate file.
fn file_dispatch(log_dir: &Path, log_level: LevelFilter) -> Result<Dispatch> {
    let open = |file_name: &str| {
        let file_path = log_dir.join(file_name);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .with_context(|| format!("Could not create log file {}", file_path.display()))
    };

    Ok(Dispatch::new()
        .format(write_log_plain)
        .chain(
            Dispatch::new()
                .filter(|metadata| !is_warning_or_error(metadata))
                .level(log_level.max(LevelFilter::Info))
                .chain(open(LOG_INFO_FILE_NAME)?),
        )
        .chain(
            Dispatch::new()
                .level(LevelFilter::Warn)
                .chain(open(LOG_ERROR_FILE_NAME)?),
        ))
}

/// Convert a log level string to a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    let level = match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(level)
}

/// Write a log message with a timestamp, level and target
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

/// Write to the log with no colours
fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

/// Write to the log with optional colours
fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    use_colour: bool,
    colours: &ColoredLevelConfig,
) {
    // Format output with or without colour based on `use_colour`
    if use_colour {
        write_log(out, colours.color(record.level()), record.target(), message);
    } else {
        write_log_plain(out, message, record);
    }
}
