use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "tag_server.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub tags_file: Option<PathBuf>,
    pub max_results: usize,
    pub response_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            tags_file: None,
            max_results: 25,
            response_delay_ms: 0,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional settings file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<Settings>(&raw) {
            Ok(file_cfg) => file_cfg,
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring malformed settings file");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    };

    apply_env_overrides(&mut settings, env);
    settings
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("TAG_SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = env("APP__TAGS_FILE") {
        let v = v.trim();
        settings.tags_file = (!v.is_empty()).then(|| PathBuf::from(v));
    }

    if let Some(v) = env("APP__MAX_RESULTS") {
        match v.parse::<usize>() {
            Ok(parsed) if parsed > 0 => settings.max_results = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__MAX_RESULTS"),
        }
    }

    if let Some(v) = env("APP__RESPONSE_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.response_delay_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__RESPONSE_DELAY_MS"),
        }
    }
}
