//! Setup and initialization functions for CLI

use log::LevelFilter;

/// Map `-v` repetitions onto a log level; warnings are always shown.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialise `env_logger` once at startup. `RUST_LOG`, when set, wins over
/// the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for_verbosity(verbosity))
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env();

    if let Err(e) = builder.try_init() {
        // Already configured - this is fine, just ignore
        eprintln!("Note: logger already configured: {}", e);
    }
}
