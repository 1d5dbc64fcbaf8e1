use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use crate::config;

/// Send `tracing` output to the log file.
///
/// The terminal is in raw mode while we run, so nothing is logged to it.
/// `RUST_LOG` wins over `logging.filter`.
pub fn configure_logging(settings: &config::Settings) {
    use tracing_subscriber::prelude::*;

    let Some(path) = settings.log_file() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("legato: logging disabled, cannot open {}: {e}", path.display());
            return;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
