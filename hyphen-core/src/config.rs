//! Installer configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. Command-line flags (applied by the caller)
//! 2. `HYPHEN_DICTIONARY_DIR` / `HYPHEN_REPOSITORY` environment variables
//! 3. `config.yaml` in the per-user config directory, or an explicit path
//! 4. Built-in defaults
//!
//! ```yaml
//! directory: /home/me/.local/share/hyphen
//! repository: http://cgit.freedesktop.org/libreoffice/dictionaries/plain/
//! use_description: true
//! timeout_seconds: 30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default dictionary repository (LibreOffice dictionaries)
pub const DEFAULT_REPOSITORY: &str = "http://cgit.freedesktop.org/libreoffice/dictionaries/plain/";

/// Environment variable overriding the installation directory
pub const DIRECTORY_ENV: &str = "HYPHEN_DICTIONARY_DIR";

/// Environment variable overriding the repository URL
pub const REPOSITORY_ENV: &str = "HYPHEN_REPOSITORY";

const CONFIG_FILE: &str = "config.yaml";
const APP_NAME: &str = "hyphen";
const MIN_TIMEOUT_SECONDS: u64 = 1;

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_use_description() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

/// Per-user data directory where dictionaries are installed by default
pub fn default_dictionary_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME)))
        .unwrap_or_else(|| PathBuf::from(".hyphen"))
}

/// Location of the per-user config file, if a config directory is known
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME)))
        .map(|dir| dir.join(CONFIG_FILE))
}

/// Settings shared by every install/uninstall operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Installation directory holding dictionaries and `dictionaries.json`
    #[serde(default = "default_dictionary_dir")]
    pub directory: PathBuf,

    /// Repository base URL; always ends with `/`
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Look up `dictionaries.xcu` descriptors before guessing URLs
    #[serde(default = "default_use_description")]
    pub use_description: bool,

    /// Network timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            directory: default_dictionary_dir(),
            repository: default_repository(),
            use_description: default_use_description(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl InstallerConfig {
    /// Load from `path` (or the default config file) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Load a config file; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config: Self = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        let repository = config.repository.clone();
        config.set_repository(&repository);
        Ok(config)
    }

    /// Apply `HYPHEN_DICTIONARY_DIR` and `HYPHEN_REPOSITORY`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(directory) = lookup(DIRECTORY_ENV).filter(|v| !v.is_empty()) {
            self.directory = PathBuf::from(directory);
        }
        if let Some(repository) = lookup(REPOSITORY_ENV).filter(|v| !v.is_empty()) {
            self.set_repository(&repository);
        }
        self
    }

    /// Set the repository URL, ensuring a trailing `/`
    pub fn set_repository(&mut self, repository: &str) {
        self.repository = if repository.ends_with('/') {
            repository.to_string()
        } else {
            format!("{repository}/")
        };
    }

    /// Network timeout, clamped to at least one second
    pub fn timeout(&self) -> Duration {
        if self.timeout_seconds < MIN_TIMEOUT_SECONDS {
            tracing::warn!(
                "Configured timeout_seconds={} is too low; using minimum of {} seconds",
                self.timeout_seconds,
                MIN_TIMEOUT_SECONDS
            );
            return Duration::from_secs(MIN_TIMEOUT_SECONDS);
        }
        Duration::from_secs(self.timeout_seconds)
    }

    /// Save to `path`, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }
}
