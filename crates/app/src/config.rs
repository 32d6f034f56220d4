//! Settings loading: `settings.json` in the platform config dir, then env.
//!
//! Nothing here fails. A missing or broken file gives defaults, and a missing
//! endpoint or key just leaves the assistant on fallback replies.

use shared::settings::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENDPOINT_ENV: &str = "WALLETX_AI_ENDPOINT";
pub const API_KEY_ENV: &str = "WALLETX_AI_API_KEY";

pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "WalletX", "WalletX")
        .map(|p| p.config_dir().join("settings.json"))
}

/// Load settings from the default location and the process environment.
pub fn load_settings() -> AppSettings {
    let mut settings = match config_path() {
        Some(path) => read_settings_file(&path),
        None => AppSettings::default(),
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn read_settings_file(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice::<AppSettings>(&bytes) {
            Ok(settings) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed settings file");
                AppSettings::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read settings file");
            AppSettings::default()
        }
    }
}

/// Environment values win over the file. Blank values are ignored.
pub fn apply_env_overrides(settings: &mut AppSettings, lookup: impl Fn(&str) -> Option<String>) {
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(endpoint) = non_blank(ENDPOINT_ENV) {
        settings.assistant.endpoint = Some(endpoint.trim().to_string());
    }
    if let Some(key) = non_blank(API_KEY_ENV) {
        settings.assistant.api_key = Some(key);
    }
}
