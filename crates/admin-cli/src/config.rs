//! Persisted console settings.
//!
//! Stored as TOML in the user's config directory. Flags given on the command
//! line win over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use admin_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use admin_core::ConsoleOptions;
use admin_model::display::{DEFAULT_DATETIME_FORMAT, is_valid_datetime_format};
use admin_model::{DEFAULT_LIMIT, DisplayOptions};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub display: DisplaySettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Rows requested per page.
    pub page_size: usize,
    /// `chrono` format for datetime columns.
    pub datetime_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LIMIT,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Where action downloads are written. Defaults to the user's download
    /// directory.
    pub download_dir: Option<PathBuf>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// holds an unusable datetime format.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("parse settings {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("check settings {}", path.display()))?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns an error if `display.datetime_format` has a specifier
    /// `chrono` does not know.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            is_valid_datetime_format(&self.display.datetime_format),
            "invalid display.datetime_format {:?}",
            self.display.datetime_format
        );
        Ok(())
    }

    /// Write settings to `path`, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).with_context(|| format!("write settings {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize settings")
    }

    /// Default settings file in the platform config directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "carrot", "admin-console")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(base_url) = &overrides.base_url {
            self.server.base_url.clone_from(base_url);
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.server.timeout_secs = timeout;
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server.base_url.clone(),
            timeout: Duration::from_secs(self.server.timeout_secs),
            user_agent: self.server.user_agent.clone(),
        }
    }

    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            page_size: self.display.page_size.max(1),
            display: DisplayOptions {
                datetime_format: self.display.datetime_format.clone(),
            },
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output.download_dir {
            return dir.clone();
        }
        directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
