//! File logging. The terminal belongs to the UI, so everything `tracing`
//! emits goes to `<cache_dir>/notedeck/notedeck.log` instead.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides the configured level, same syntax as `RUST_LOG`.
pub const LOG_ENV: &str = "NOTEDECK_LOG";

pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("notedeck")
        .join("notedeck.log")
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        // our own crate at the configured level, dependencies only when loud
        EnvFilter::try_new(format!("warn,notedeck={level}")).unwrap_or_else(|_| EnvFilter::new("warn,notedeck=info"))
    })
}

/// Install the global subscriber. Call once, before the terminal is taken over.
pub fn init_logging(level: &str) -> io::Result<PathBuf> {
    let path = log_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false).with_target(true);
    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(layer)
        .try_init()
        .map_err(io::Error::other)?;
    Ok(path)
}
