//! Tool settings
//!
//! Handles loading and validating the YAML settings file, and the
//! [`SettingsProvider`] seam through which the telemetry client asks for a
//! configured port.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Source of the user's configured Web Remote port.
///
/// `0` means "not configured": the port is then detected from `reaper.ini`.
pub trait SettingsProvider {
    fn configured_port(&self) -> u16;
}

impl SettingsProvider for u16 {
    fn configured_port(&self) -> u16 {
        *self
    }
}

/// Root settings structure
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Web Remote port, 0 to auto-detect
    #[serde(default)]
    pub web_remote_port: u16,
    /// HTTP request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Explicit `reaper.ini` location (portable installs)
    #[serde(default)]
    pub reaper_ini: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            web_remote_port: 0,
            timeout_ms: default_timeout_ms(),
            reaper_ini: None,
        }
    }
}

impl SettingsProvider for Settings {
    fn configured_port(&self) -> u16 {
        self.web_remote_port
    }
}

impl Settings {
    /// Load settings from file with validation. A missing file yields defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML settings: {}", path.display()))?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than 0");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Apply command-line / environment overrides on top of the file values
    pub fn with_overrides(mut self, port: Option<u16>, reaper_ini: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.web_remote_port = port;
        }
        if reaper_ini.is_some() {
            self.reaper_ini = reaper_ini;
        }
        self
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let settings = Settings::load(temp_dir.path().join("settings.yaml")).await?;

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.configured_port(), 0);
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_with_overrides() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("settings.yaml");

        std::fs::write(&path, "web_remote_port: 2307\nreaper_ini: /portable/reaper.ini\n")?;
        let settings = Settings::load(&path).await?;
        assert_eq!(settings.configured_port(), 2307);
        assert_eq!(settings.timeout_ms, 5000);
        assert_eq!(settings.reaper_ini, Some(PathBuf::from("/portable/reaper.ini")));

        let settings = settings.with_overrides(Some(9000), Some(PathBuf::from("/opt/reaper.ini")));
        assert_eq!(settings.web_remote_port, 9000);
        assert_eq!(settings.reaper_ini, Some(PathBuf::from("/opt/reaper.ini")));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("settings.yaml");

        std::fs::write(&path, "timeout_ms: 0\n")?;
        assert!(Settings::load(&path).await.is_err());

        std::fs::write(&path, "web_remote_port: 700000\n")?;
        assert!(Settings::load(&path).await.is_err());
        Ok(())
    }

    #[test]
    fn test_overrides_keep_file_values_when_absent() {
        let settings = Settings {
            web_remote_port: 8080,
            ..Settings::default()
        }
        .with_overrides(None, None);
        assert_eq!(settings.web_remote_port, 8080);
        assert_eq!(8080u16.configured_port(), 8080);
    }
}
