//! Live track state from REAPER's Web Remote

pub mod client;
pub mod track;

pub use client::{resolve_port, WebRemoteClient, DEFAULT_TIMEOUT};
pub use track::{multiplier_to_db, parse_track_data, Track, SILENCE_DB};
