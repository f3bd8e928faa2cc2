//! Minimal `log` backend for the CLI: one line per record on stderr.
//!
//! Library code only uses the `log` macros; embedding applications install
//! whatever backend they like and never need this module.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Info => eprintln!("{}", record.args()),
            level       => eprintln!("{}: {}", level.as_str().to_lowercase(), record.args()),
        }
    }

    fn flush(&self) {}
}

/// Install the stderr logger.  `LevelFilter::Off` mutes everything.
/// Calling it twice only changes the level.
pub fn init(level: LevelFilter) {
    log::set_logger(&LOGGER).ok();
    log::set_max_level(level);
}
