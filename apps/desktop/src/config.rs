use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use chrono::FixedOffset;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "captains_log.toml";
const FALLBACK_DATABASE_PATH: &str = "./data/captains_log.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
    /// Offset used for timeline dates. `None` follows the machine's local offset.
    pub timezone_offset_minutes: Option<i32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            log_level: "info".into(),
            timezone_offset_minutes: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    database_url: Option<String>,
    log_level: Option<String>,
    timezone_offset_minutes: Option<i32>,
}

impl Settings {
    pub fn timeline_offset(&self) -> anyhow::Result<Option<FixedOffset>> {
        let Some(minutes) = self.timezone_offset_minutes else {
            return Ok(None);
        };
        match minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
            Some(offset) => Ok(Some(offset)),
            None => bail!("timezone offset of {minutes} minutes is out of range"),
        }
    }
}

/// Defaults, then the config file, then the environment. An explicitly named config file must
/// exist; the default one is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    config_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file_cfg = match config_path {
        Some(path) => Some(read_file_settings(path)?),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                Some(read_file_settings(path)?)
            } else {
                None
            }
        }
    };
    if let Some(file_cfg) = file_cfg {
        if let Some(v) = file_cfg.database_url {
            settings.database_url = v;
        }
        if let Some(v) = file_cfg.log_level {
            settings.log_level = v;
        }
        if let Some(v) = file_cfg.timezone_offset_minutes {
            settings.timezone_offset_minutes = Some(v);
        }
    }

    if let Some(v) = env("CAPTAINS_LOG_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("CAPTAINS_LOG_LOG_LEVEL") {
        settings.log_level = v;
    }
    if let Some(v) = env("CAPTAINS_LOG_TIMEZONE_OFFSET_MINUTES") {
        let minutes = v
            .trim()
            .parse::<i32>()
            .with_context(|| format!("CAPTAINS_LOG_TIMEZONE_OFFSET_MINUTES '{v}' is not a number"))?;
        settings.timezone_offset_minutes = Some(minutes);
    }

    Ok(settings)
}

fn read_file_settings(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

/// Turns plain file paths into `sqlite://` urls. Anything already carrying a scheme passes
/// through untouched.
pub fn prepare_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return default_database_url();
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn default_database_url() -> String {
    let path = dirs::data_local_dir()
        .map(|dir| dir.join("captains_log").join("log.sqlite3"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATABASE_PATH));
    prepare_database_url(&path.to_string_lossy())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
