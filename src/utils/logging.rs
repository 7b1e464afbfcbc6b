use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Initialize the logger with custom formatting.
///
/// actix internals are capped at `warn` unless tracing is requested, so
/// per-exchange filter decisions stay readable at `debug`.
pub fn init_logger(level: LevelFilter) {
    let framework = framework_level(level);

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, level)
        .filter(Some("actix_server"), framework)
        .filter(Some("actix_http"), framework)
        .init();
}

/// Level applied to actix targets for a given application level
pub fn framework_level(level: LevelFilter) -> LevelFilter {
    if level == LevelFilter::Trace {
        LevelFilter::Trace
    } else {
        level.min(LevelFilter::Warn)
    }
}

/// Get log level from string, falling back to `info`
pub fn get_log_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}
