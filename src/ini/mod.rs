//! `reaper.ini` parsing and control surface management

pub mod document;
pub mod registry;
pub mod surface;

pub use document::{ConfigDocument, LineEnding};
pub use registry::ControlSurfaceRegistry;
pub use surface::{ControlSurfaceEntry, SurfaceKind, WebRemoteConfig};
