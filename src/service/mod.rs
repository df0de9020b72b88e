//! Operations offered to the CLI and REPL.
//!
//! Each call works from scratch: `reaper.ini` is located and read again,
//! and a fresh HTTP client is built for every telemetry request.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Settings, SettingsProvider};
use crate::error::RemoteResult;
use crate::ini::{ControlSurfaceEntry, ControlSurfaceRegistry, WebRemoteConfig};
use crate::telemetry::{resolve_port, Track, WebRemoteClient, DEFAULT_TIMEOUT};


/// Web Remote operations over an injected settings provider
#[derive(Debug, Clone)]
pub struct WebRemoteService<P = Settings> {
    provider: P,
    ini: Option<PathBuf>,
    timeout: Duration,
}

impl WebRemoteService<Settings> {
    /// Service configured entirely from loaded settings
    pub fn from_settings(settings: Settings) -> Self {
        let ini = settings.reaper_ini.clone();
        let timeout = settings.timeout();
        Self {
            provider: settings,
            ini,
            timeout,
        }
    }
}

impl<P: SettingsProvider> WebRemoteService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            ini: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use this `reaper.ini` instead of the platform default
    pub fn with_ini(mut self, ini: impl Into<PathBuf>) -> Self {
        self.ini = Some(ini.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> RemoteResult<ControlSurfaceRegistry> {
        ControlSurfaceRegistry::locate(self.ini.as_deref())
    }

    pub async fn get_web_remote_config(&self) -> RemoteResult<WebRemoteConfig> {
        self.registry()?.web_remote().await
    }

    /// Add a new enabled Web Remote entry on `port`; returns its `csurf_N` id
    pub async fn set_web_remote_port(&self, port: u16) -> RemoteResult<u32> {
        self.registry()?.add_web_remote(port).await
    }

    pub async fn set_web_remote_enabled(&self, enabled: bool) -> RemoteResult<WebRemoteConfig> {
        self.registry()?.set_web_remote_enabled(enabled).await
    }

    pub async fn list_surfaces(&self) -> RemoteResult<Vec<ControlSurfaceEntry>> {
        self.registry()?.surfaces().await
    }

    /// Client for the configured or detected Web Remote port
    pub async fn client(&self) -> RemoteResult<WebRemoteClient> {
        let port = resolve_port(&self.provider, || self.registry()).await?;
        WebRemoteClient::with_timeout(port, self.timeout)
    }

    pub async fn get_tracks(&self) -> RemoteResult<Vec<Track>> {
        self.client().await?.fetch_tracks().await
    }

    pub async fn get_track_names(&self) -> RemoteResult<Vec<String>> {
        self.client().await?.fetch_track_names().await
    }

    pub async fn get_project_info(&self) -> RemoteResult<BTreeMap<String, String>> {
        self.client().await?.fetch_project_info().await
    }

    /// False when no port can be resolved or the endpoint does not answer
    pub async fn is_running(&self) -> bool {
        match self.client().await {
            Ok(client) => client.is_running().await,
            Err(_) => false,
        }
    }
}
