use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    pub db_path: String,
    pub music_dir: Option<String>,
    pub table_output: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("MPD_DB_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("mpd_db.yaml"))
            .unwrap_or_else(|| PathBuf::from("mpd_db.yaml")),
        Err(_) => PathBuf::from("mpd_db.yaml"),
    }
}

pub fn load_config(path: &Path) -> Result<(DumpConfig, bool), ConfigError> {
    if !path.exists() {
        return Ok((DumpConfig::default(), false));
    }
    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    Ok((config, true))
}

pub fn parse_config(contents: &str) -> Result<DumpConfig, ConfigError> {
    let mut config: DumpConfig = serde_yaml::from_str(contents)?;
    config.music_dir = non_empty(config.music_dir.take());
    config.table_output = non_empty(config.table_output.take());
    Ok(config)
}

pub fn apply_overrides(
    config: &mut DumpConfig,
    env_db_path: Option<String>,
    env_music_dir: Option<String>,
    args: &[String],
) {
    if let Some(value) = non_empty(env_db_path) {
        config.db_path = value;
    }
    if let Some(value) = non_empty(env_music_dir) {
        config.music_dir = Some(value);
    }
    if let Some(value) = args.first() {
        config.db_path = value.clone();
    }
    if let Some(value) = args.get(1) {
        config.music_dir = Some(value.clone());
    }
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
