use std::path::Path;

use log::LevelFilter;

/// Log level from `RUST_LOG`. Accepts a bare level or any filter string mentioning one; without
/// it, debug builds log at Debug and release builds at Info.
pub fn get_log_level() -> LevelFilter {
    level_from(std::env::var("RUST_LOG").ok().as_deref())
}

fn level_from(rust_log: Option<&str>) -> LevelFilter {
    match rust_log {
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        Some("off") => LevelFilter::Off,
        _ => {
            if let Some(rust_log) = rust_log {
                if rust_log.contains("debug") {
                    return LevelFilter::Debug;
                } else if rust_log.contains("trace") {
                    return LevelFilter::Trace;
                } else if rust_log.contains("warn") {
                    return LevelFilter::Warn;
                } else if rust_log.contains("error") {
                    return LevelFilter::Error;
                }
            }
            #[cfg(debug_assertions)]
            return LevelFilter::Debug;
            #[cfg(not(debug_assertions))]
            return LevelFilter::Info;
        }
    }
}

/// Install the global logger: stderr, plus `log_file` when given.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(get_log_level())
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    log::debug!("Logging initialized at {}", get_log_level());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!(level_from(Some("trace")), LevelFilter::Trace);
        assert_eq!(level_from(Some("off")), LevelFilter::Off);
        assert_eq!(level_from(Some("pawn_vartable_lib=debug")), LevelFilter::Debug);
        assert_eq!(level_from(Some("hyper=warn")), LevelFilter::Warn);
    }

    #[test]
    fn test_default_level() {
        let expected = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        assert_eq!(level_from(None), expected);
        assert_eq!(level_from(Some("verbose")), expected);
    }
}
