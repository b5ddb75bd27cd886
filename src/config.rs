use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_API: &str = "https://stoat.chat/api/webhooks";
const DEFAULT_TIMEOUT: u64 = 15;

/// Optional settings from `config.toml`. Webhook tokens are never stored here.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL that webhook paths are appended to
    pub api: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

impl Config {
    /// Load the config file (if any), then apply `STOAT_API`.
    pub fn load() -> Result<Self> {
        let config = match get_configpath() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.with_api_override(env::var("STOAT_API").ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(config_str) => toml::from_str(&config_str)
                .wrap_err_with(|| format!("Invalid config file {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err)
                .wrap_err_with(|| format!("Failed to open the config file {}", path.display())),
        }
    }

    pub fn with_api_override(mut self, api: Option<String>) -> Self {
        if let Some(api) = api.filter(|api| !api.is_empty()) {
            self.api = Some(api);
        }
        self
    }

    pub fn api_base(&self) -> &str {
        self.api.as_deref().unwrap_or(DEFAULT_API)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
    }
}

fn get_configpath() -> Option<PathBuf> {
    if let Some(path) = env::var_os("STOAT_WH_CONFIG") {
        return Some(path.into());
    }
    dirs::config_dir().map(|dir| dir.join("stoat-wh").join("config.toml"))
}
