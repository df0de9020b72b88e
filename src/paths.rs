//! REAPER resource path resolution.
//!
//! REAPER keeps its resource directory (holding `reaper.ini` and the
//! `Scripts` folder) in the per-user configuration directory:
//!
//! - **macOS**: `~/Library/Application Support/REAPER`
//! - **Windows**: `%APPDATA%\REAPER`
//! - **Linux**: `$XDG_CONFIG_HOME/REAPER`, falling back to `~/.config/REAPER`
//!
//! An explicit `reaper.ini` path (from `--ini` / `REAPER_INI`) bypasses
//! detection entirely, which is how portable installs are handled.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};

/// Directory name REAPER uses under the user configuration directory
const RESOURCE_DIR: &str = "REAPER";

/// Name of REAPER's main configuration file
pub const INI_FILE: &str = "reaper.ini";

/// REAPER resource paths for the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaperPaths {
    /// REAPER resource directory
    pub resource_dir: PathBuf,
    /// Path to `reaper.ini` (may not exist)
    pub ini: PathBuf,
    /// Path to the ReaScript directory
    pub scripts_dir: PathBuf,
}

impl ReaperPaths {
    /// Detect the resource directory for the running platform.
    pub fn detect() -> RemoteResult<Self> {
        let config_dir = dirs::config_dir().ok_or(RemoteError::ConfigDirUnavailable)?;
        debug!("[paths] dirs::config_dir() = {}", config_dir.display());
        Ok(Self::from_resource_dir(config_dir.join(RESOURCE_DIR)))
    }

    /// Build paths rooted at an explicit resource directory.
    pub fn from_resource_dir(resource_dir: impl Into<PathBuf>) -> Self {
        let resource_dir = resource_dir.into();
        Self {
            ini: resource_dir.join(INI_FILE),
            scripts_dir: resource_dir.join("Scripts"),
            resource_dir,
        }
    }

    /// Return the `reaper.ini` path, failing if the file does not exist.
    pub fn existing_ini(&self) -> RemoteResult<PathBuf> {
        ensure_exists(&self.ini)
    }
}

/// Resolve the `reaper.ini` to operate on.
///
/// An override is used as-is (it still has to exist); otherwise the
/// platform default is detected.
pub fn resolve_ini(override_path: Option<&Path>) -> RemoteResult<PathBuf> {
    match override_path {
        Some(path) => ensure_exists(path),
        None => ReaperPaths::detect()?.existing_ini(),
    }
}

fn ensure_exists(path: &Path) -> RemoteResult<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(RemoteError::ConfigNotFound {
            path: path.to_path_buf(),
        })
    }
}
