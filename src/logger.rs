use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(Level::Error.to_level_filter()),
        "warn" => Some(Level::Warn.to_level_filter()),
        "info" => Some(Level::Info.to_level_filter()),
        "debug" => Some(Level::Debug.to_level_filter()),
        "trace" => Some(Level::Trace.to_level_filter()),
        _ => None,
    }
}

/// Installs the stderr logger; level from `CPU_SCHED_LOG`, default info.
pub fn init() -> Result<(), SetLoggerError> {
    let level = std::env::var("CPU_SCHED_LOG")
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Info);

    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
