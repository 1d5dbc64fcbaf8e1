use std::path::PathBuf;

use crate::config::{self, Settings};

/// Settings for this run. A missing file is fine; a broken or invalid one
/// is reported on stderr (logging is not up yet) and replaced by defaults.
pub fn load_settings() -> Settings {
    let origin = config::resolve_config_path()
        .filter(|p| p.is_file())
        .map_or_else(|| "environment".to_string(), |p: PathBuf| p.display().to_string());

    let loaded = Settings::load()
        .map_err(|e| e.to_string())
        .and_then(|s| s.validate().map(|()| s));
    match loaded {
        Ok(settings) => settings,
        Err(msg) => {
            eprintln!("legato: ignoring settings from {origin}: {msg}");
            Settings::default()
        }
    }
}
