//! HTTP client for REAPER's Web Remote text protocol.
//!
//! Every call is an independent GET with a bounded timeout; there is no
//! connection reuse between calls and no retry.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use super::track::{parse_track_data, Track};
use crate::config::SettingsProvider;
use crate::error::{RemoteError, RemoteResult};
use crate::ini::ControlSurfaceRegistry;

/// Request timeout used unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Track listing endpoint
pub const TRACK_PATH: &str = "/_/TRACK";

/// Bare command endpoint, answers with project-level key/value lines
pub const INFO_PATH: &str = "/_";

/// Pick the Web Remote port.
///
/// A configured (non-zero) port wins. Otherwise the port of the first Web
/// Remote entry in `reaper.ini` is used; if that lookup fails the error is
/// returned as-is.
pub async fn resolve_port(
    settings: &dyn SettingsProvider,
    registry: impl FnOnce() -> RemoteResult<ControlSurfaceRegistry>,
) -> RemoteResult<u16> {
    let configured = settings.configured_port();
    if configured != 0 {
        debug!("Using configured Web Remote port {}", configured);
        return Ok(configured);
    }

    let config = registry()?.web_remote().await?;
    debug!(
        "Detected Web Remote port {} from csurf_{}",
        config.port, config.csurf_id
    );
    Ok(config.port)
}

/// Client bound to one Web Remote instance
#[derive(Debug, Clone)]
pub struct WebRemoteClient {
    base_url: String,
    http: reqwest::Client,
}

impl WebRemoteClient {
    /// Client for `http://localhost:{port}` with the default timeout
    pub fn new(port: u16) -> RemoteResult<Self> {
        Self::with_timeout(port, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(port: u16, timeout: Duration) -> RemoteResult<Self> {
        if port == 0 {
            return Err(RemoteError::InvalidPort(0));
        }
        Self::from_base_url(format!("http://localhost:{}", port), timeout)
    }

    /// Client for an explicit base URL such as `http://127.0.0.1:8080`
    pub fn from_base_url(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Connection {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All tracks of the current project, master first
    pub async fn fetch_tracks(&self) -> RemoteResult<Vec<Track>> {
        let body = self.get(TRACK_PATH).await?;
        let tracks = parse_track_data(&body);
        info!("Fetched {} tracks from {}", tracks.len(), self.base_url);
        Ok(tracks)
    }

    pub async fn fetch_track_names(&self) -> RemoteResult<Vec<String>> {
        Ok(self
            .fetch_tracks()
            .await?
            .into_iter()
            .map(|track| track.name)
            .collect())
    }

    /// Key/value lines returned by the bare command endpoint.
    ///
    /// Each line is split on its first tab; lines without a tab are skipped.
    pub async fn fetch_project_info(&self) -> RemoteResult<BTreeMap<String, String>> {
        let body = self.get(INFO_PATH).await?;
        Ok(body
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect())
    }

    /// Whether the Web Remote answers with a success status
    pub async fn is_running(&self) -> bool {
        match self.get(INFO_PATH).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Web Remote not reachable: {}", e);
                false
            }
        }
    }

    async fn get(&self, path: &str) -> RemoteResult<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| RemoteError::Connection {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| {
            if source.is_timeout() {
                RemoteError::Connection { url, source }
            } else {
                RemoteError::Protocol {
                    url,
                    detail: format!("failed to read response body: {}", source),
                }
            }
        })
    }
}
