//! REAPER Remote library
//!
//! Reads and edits the control surface section of `reaper.ini` to find or
//! create REAPER's Web Remote, and decodes live track state from the Web
//! Remote's text protocol.

pub mod config;
pub mod error;
pub mod format;
pub mod ini;
pub mod paths;
pub mod service;
pub mod telemetry;

pub use error::{ErrorKind, RemoteError, RemoteResult};
