//! Web Remote discovery and creation on top of [`ConfigDocument`].
//!
//! The free functions work on an in-memory document and never touch disk.
//! [`ControlSurfaceRegistry`] wraps them in a load -> mutate -> save cycle
//! against one `reaper.ini`; nothing is cached between calls.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::document::ConfigDocument;
use super::surface::{
    http_entry_value, replace_token, ControlSurfaceEntry, WebRemoteConfig, SURFACE_MAX_ID_KEY,
    SURFACE_PREFIX,
};
use crate::error::{RemoteError, RemoteResult};
use crate::paths;

/// Every control surface entry, in file order
pub fn surfaces(doc: &ConfigDocument) -> Vec<ControlSurfaceEntry> {
    doc.find_lines_with_prefix(SURFACE_PREFIX)
        .into_iter()
        .filter_map(|line| ControlSurfaceEntry::parse(line.id, &line.value))
        .collect()
}

/// The first Web Remote entry in file order, with the index of its line
fn first_web_remote(doc: &ConfigDocument) -> Option<(usize, WebRemoteConfig)> {
    doc.find_lines_with_prefix(SURFACE_PREFIX)
        .into_iter()
        .find_map(|line| {
            let config = ControlSurfaceEntry::parse(line.id, &line.value)?.web_remote()?;
            Some((line.index, config))
        })
}

/// Web Remote settings from the first `HTTP`/`WEBR` entry in file order.
///
/// File order wins over entry kind, id and enabled state.
pub fn resolve(doc: &ConfigDocument) -> Option<WebRemoteConfig> {
    first_web_remote(doc).map(|(_, config)| config)
}

/// Add an enabled `HTTP` entry for `port` and return its id.
///
/// Existing entries are never touched. The new id is one above the highest
/// id of any surface type, the line goes right after the last surface line
/// (or at the end of the file), and `csurf_cnt` is set to the new id.
/// `csurf_cnt` holds the highest id, not a count; REAPER reads it that way.
///
/// Returns `None`, leaving the document untouched, when the new id would not
/// fit in a `u32`.
pub fn create_entry(doc: &mut ConfigDocument, port: u16) -> Option<u32> {
    let new_id = next_surface_id(doc)?;
    let last_index = doc
        .find_lines_with_prefix(SURFACE_PREFIX)
        .last()
        .map(|line| line.index);

    let line = format!(
        "{}{}={}",
        SURFACE_PREFIX,
        new_id,
        http_entry_value(port, true)
    );
    match last_index {
        Some(index) => doc.insert_line_after(index, line),
        None => doc.append_line(line),
    }

    let max_id_line = format!("{}={}", SURFACE_MAX_ID_KEY, new_id);
    match doc.find_key(SURFACE_MAX_ID_KEY).map(|(index, _)| index) {
        Some(index) => doc.replace_line(index, max_id_line),
        None => doc.append_line(max_id_line),
    }

    debug!("Created {}{} for port {}", SURFACE_PREFIX, new_id, port);
    Some(new_id)
}

/// One above the highest `csurf_N` id of any surface type, or 0.
///
/// Keys with an all-digit suffix too large for a `u32` count as well, so
/// they yield `None` instead of being skipped.
fn next_surface_id(doc: &ConfigDocument) -> Option<u32> {
    let mut next = 0u32;
    for line in doc.lines() {
        let Some((key, _)) = line.trim().split_once('=') else {
            continue;
        };
        let Some(suffix) = key.strip_prefix(SURFACE_PREFIX) else {
            continue;
        };
        match suffix.parse::<u32>() {
            Ok(id) => next = next.max(id.checked_add(1)?),
            Err(_) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
                return None
            }
            Err(_) => {}
        }
    }
    Some(next)
}

/// Rewrite the enabled flag of the first Web Remote entry in place.
///
/// Only the flag token changes; spacing, field order and placeholder tokens
/// such as `''` stay as they were. Returns the updated settings, or `None`
/// when there is no Web Remote entry.
pub fn set_enabled(doc: &mut ConfigDocument, enabled: bool) -> Option<WebRemoteConfig> {
    let (index, _) = first_web_remote(doc)?;
    let line = doc.line_bytes(index)?;
    let eq = line.iter().position(|&b| b == b'=')?;
    let flag: &[u8] = if enabled { b"1" } else { b"0" };

    let mut updated = line[..=eq].to_vec();
    updated.extend(replace_token(&line[eq + 1..], 1, flag)?);

    doc.replace_line(index, updated);
    first_web_remote(doc).map(|(_, config)| config)
}

/// Registry bound to one `reaper.ini` on disk
#[derive(Debug, Clone)]
pub struct ControlSurfaceRegistry {
    ini: PathBuf,
}

impl ControlSurfaceRegistry {
    pub fn new(ini: impl Into<PathBuf>) -> Self {
        Self { ini: ini.into() }
    }

    /// Use `override_path` if given, otherwise the platform's `reaper.ini`
    pub fn locate(override_path: Option<&Path>) -> RemoteResult<Self> {
        paths::resolve_ini(override_path).map(Self::new)
    }

    pub fn ini_path(&self) -> &Path {
        &self.ini
    }

    pub async fn surfaces(&self) -> RemoteResult<Vec<ControlSurfaceEntry>> {
        let doc = ConfigDocument::load(&self.ini).await?;
        Ok(surfaces(&doc))
    }

    pub async fn web_remote(&self) -> RemoteResult<WebRemoteConfig> {
        let doc = ConfigDocument::load(&self.ini).await?;
        resolve(&doc).ok_or_else(|| self.surface_not_found())
    }

    /// Append a new enabled Web Remote entry listening on `port`.
    ///
    /// Calling this twice with the same port creates two entries.
    pub async fn add_web_remote(&self, port: u16) -> RemoteResult<u32> {
        if port == 0 {
            return Err(RemoteError::InvalidPort(0));
        }

        let mut doc = ConfigDocument::load(&self.ini).await?;
        let id = create_entry(&mut doc, port).ok_or_else(|| RemoteError::SurfaceIdsExhausted {
            path: self.ini.clone(),
        })?;
        doc.save(&self.ini).await?;

        info!(
            "Added Web Remote {}{} on port {} to {}",
            SURFACE_PREFIX,
            id,
            port,
            self.ini.display()
        );
        Ok(id)
    }

    pub async fn set_web_remote_enabled(&self, enabled: bool) -> RemoteResult<WebRemoteConfig> {
        let mut doc = ConfigDocument::load(&self.ini).await?;
        let config = set_enabled(&mut doc, enabled).ok_or_else(|| self.surface_not_found())?;
        doc.save(&self.ini).await?;

        info!(
            "Web Remote {}{} {} in {}",
            SURFACE_PREFIX,
            config.csurf_id,
            if enabled { "enabled" } else { "disabled" },
            self.ini.display()
        );
        Ok(config)
    }

    fn surface_not_found(&self) -> RemoteError {
        RemoteError::SurfaceNotFound {
            path: self.ini.clone(),
        }
    }
}
