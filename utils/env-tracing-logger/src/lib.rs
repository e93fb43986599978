//! Console (and optionally file) logging for the camprobe binaries.
//!
//! The filter comes from `RUST_LOG`. When it is unset or cannot be parsed, a
//! per-binary default is used instead so that `info` messages of the binary
//! itself are shown without any configuration.

use time::{UtcOffset, format_description::well_known::Iso8601};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::OffsetTime},
    layer::SubscriberExt,
};

/// Filter used by [init] when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "info";

struct Guard {}

impl Drop for Guard {
    fn drop(&mut self) {}
}

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync + 'static>>;

pub fn init() -> impl Drop {
    init_with_default(DEFAULT_DIRECTIVES)
}

/// Log to the console, filtering by `RUST_LOG` or else `default_directives`.
///
/// If a global subscriber is already installed, logging setup is skipped and
/// the error is printed to stderr.
pub fn init_with_default(default_directives: &str) -> impl Drop {
    if let Err(e) = initiate_logging::<&str>(None, false, default_directives) {
        eprintln!("could not initiate logging: {e}");
    }
    Guard {}
}

/// Build the filter from `RUST_LOG`, falling back to `default_directives`.
pub fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Start logging to file and console, both optional.
pub fn initiate_logging<P: AsRef<std::path::Path>>(
    path: Option<P>,
    disable_console: bool,
    default_directives: &str,
) -> Result<impl Drop> {
    // Fixed offset, taken from the local timezone at startup.
    let timer = OffsetTime::new(
        UtcOffset::from_whole_seconds(chrono::Local::now().offset().local_minus_utc())?,
        Iso8601::DEFAULT,
    );

    let file_layer = if let Some(path) = &path {
        let file = std::fs::File::create(path)?;
        let file_writer = std::sync::Mutex::new(file);
        Some(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(file_writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
    } else {
        None
    };

    let console_layer = if disable_console {
        None
    } else {
        let with_ansi = !cfg!(windows);
        Some(
            fmt::layer()
                .with_timer(timer)
                .with_ansi(with_ansi)
                .with_file(true)
                .with_line_number(true),
        )
    };

    let collector = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter(default_directives));
    tracing::subscriber::set_global_default(collector)?;

    let log_var = if let Ok(var) = std::env::var("RUST_LOG") {
        format!(" with RUST_LOG=\"{var}\".")
    } else {
        format!(" with default filter \"{default_directives}\".")
    };

    if let Some(path) = &path {
        tracing::debug!(
            "Logging initiated to file \"{}\"{log_var}",
            path.as_ref().display(),
        );
    }

    if !disable_console {
        tracing::debug!("Logging initiated to console{log_var}");
    }

    Ok(Guard {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_directives_parse() {
        assert!("camprobe_props=info,warn".parse::<EnvFilter>().is_ok());
        assert!("camprobe_props=[".parse::<EnvFilter>().is_err());
    }

    #[test]
    fn file_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camprobe.log");
        {
            let _guard = initiate_logging(Some(&path), true, "debug").unwrap();
            tracing::info!("written to file");
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("written to file"));
    }
}
