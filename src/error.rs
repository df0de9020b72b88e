//! Error types for configuration and Web Remote access

use std::path::PathBuf;
use thiserror::Error;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Coarse classification used by callers to pick a user-facing hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `reaper.ini` missing, or no Web Remote control surface in it
    NotFound,
    /// Serialising or writing `reaper.ini` failed
    WriteFailure,
    /// The Web Remote endpoint could not be reached
    Connection,
    /// The endpoint answered, but not with something usable
    Protocol,
    /// Caller supplied a value outside the accepted range
    InvalidInput,
    /// Any other filesystem problem
    Io,
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("reaper.ini not found at {} (is REAPER installed?)", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error(
        "web remote (HTTP/WEBR) control surface not found in {} - make sure Web Remote is enabled in REAPER preferences",
        .path.display()
    )]
    SurfaceNotFound { path: PathBuf },

    #[error("could not determine the user configuration directory for this platform")]
    ConfigDirUnavailable,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no free control surface id left in {}", .path.display())]
    SurfaceIdsExhausted { path: PathBuf },

    #[error("invalid port {0} (must be 1-65535)")]
    InvalidPort(u32),

    #[error("failed to connect to REAPER Web Remote at {url}: {source} (is REAPER running?)")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("REAPER Web Remote at {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("unusable response from REAPER Web Remote at {url}: {detail}")]
    Protocol { url: String, detail: String },
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemoteError::ConfigNotFound { .. } | RemoteError::SurfaceNotFound { .. } => {
                ErrorKind::NotFound
            }
            RemoteError::Write { .. } | RemoteError::SurfaceIdsExhausted { .. } => {
                ErrorKind::WriteFailure
            }
            RemoteError::Connection { .. } => ErrorKind::Connection,
            RemoteError::HttpStatus { .. } | RemoteError::Protocol { .. } => ErrorKind::Protocol,
            RemoteError::InvalidPort(_) => ErrorKind::InvalidInput,
            RemoteError::ConfigDirUnavailable | RemoteError::Read { .. } => ErrorKind::Io,
        }
    }

    /// HTTP status carried by a non-success response, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
