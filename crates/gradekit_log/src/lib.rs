//! `gradekit_log` v1:
//! Terminal logger bootstrap shared by gradekit binaries.
//!
//! Records go to stderr so stdout stays reserved for operator-facing output.

use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Map a `-v` repetition count to a level filter (`warn` when zero).
pub fn derive_level_from_verbosity(n_verbose: u8) -> LevelFilter {
    match n_verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global terminal logger.
///
/// Fails if a logger was already installed in this process.
pub fn init_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();

    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}
