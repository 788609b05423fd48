use std::{env, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read configuration file")]
    ReadFailed(#[source] std::io::Error),
    #[error("failed to write configuration file")]
    WriteFailed(#[source] std::io::Error),
    #[error("failed to parse configuration file")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize configuration")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no configuration path available")]
    ConfigPathUnavailable,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page: Page,
    pub probes: ProbeSettings,
    pub daemon: Daemon,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Title of the status page.
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Maximum time to wait for a single probe before aborting it.
    pub timeout_seconds: u64,
    /// Maximum number of probes running at once.
    pub concurrency: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Daemon {
    /// Address the daemon listens on.
    pub addr: String,
    /// Interval between two page renderings.
    pub interval_seconds: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { title: "uptiny".into() }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self { timeout_seconds: 10, concurrency: 32 }
    }
}

impl Default for Daemon {
    fn default() -> Self {
        Self { addr: "0.0.0.0:8080".into(), interval_seconds: 15 }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/uptiny/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("uptiny/config.toml"))
}

impl Config {
    /// Generate the Config structure from a file.
    ///
    /// Creates a default config in ~/.config/uptiny/config.toml, or at the
    /// specified path, if one does not exist yet.
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(Error::ReadFailed)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(Error::WriteFailed)
    }
}
