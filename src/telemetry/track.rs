//! Track rows of the Web Remote `TRACK` response.
//!
//! Each row is tab separated, positionally encoded:
//!
//! ```text
//! TRACK  idx  name  flags  vol  pan  ...  ...  ...  ...  mute  solo  recarm  ...
//!   0     1    2      3     4    5    6    7    8    9    10    11     12
//! ```
//!
//! Rows that are too short or do not start with `TRACK` are dropped.
//! A field that fails to parse becomes its zero value; the row is kept.

use serde::Serialize;
use tracing::debug;

/// Literal tag of a track row
pub const TRACK_TAG: &str = "TRACK";

/// Fields required before a row is decoded; extra trailing fields are ignored
pub const MIN_TRACK_FIELDS: usize = 13;

/// dB value reported for a zero or negative volume multiplier
pub const SILENCE_DB: f64 = -150.0;

const FIELD_INDEX: usize = 1;
const FIELD_NAME: usize = 2;
const FIELD_VOLUME: usize = 4;
const FIELD_PAN: usize = 5;
const FIELD_MUTE: usize = 10;
const FIELD_SOLO: usize = 11;
const FIELD_REC_ARM: usize = 12;

/// Live state of one track. Index 0 is the master track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub index: i32,
    pub name: String,
    /// Volume in dB
    pub volume_db: f64,
    /// -1.0 (left) .. 1.0 (right), 0.0 centre; passed through unclamped
    pub pan: f64,
    pub mute: bool,
    pub solo: bool,
    pub rec_arm: bool,
}

/// Convert REAPER's linear volume multiplier to dB
pub fn multiplier_to_db(multiplier: f64) -> f64 {
    if multiplier > 0.0 && multiplier.is_finite() {
        20.0 * multiplier.log10()
    } else {
        SILENCE_DB
    }
}

/// Decode a single response line. Surrounding whitespace is ignored.
pub fn parse_track_line(line: &str) -> Option<Track> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() < MIN_TRACK_FIELDS || fields[0] != TRACK_TAG {
        return None;
    }

    let volume = fields[FIELD_VOLUME].trim().parse::<f64>().map_or(0.0, multiplier_to_db);
    let pan = fields[FIELD_PAN]
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|pan| pan.is_finite())
        .unwrap_or(0.0);

    Some(Track {
        index: fields[FIELD_INDEX].trim().parse().unwrap_or(0),
        name: fields[FIELD_NAME].to_string(),
        volume_db: volume,
        pan,
        mute: fields[FIELD_MUTE] == "1",
        solo: matches!(fields[FIELD_SOLO], "1" | "2"),
        rec_arm: fields[FIELD_REC_ARM] == "1",
    })
}

/// Decode a full `TRACK` response body
pub fn parse_track_data(body: &str) -> Vec<Track> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let track = parse_track_line(line);
            if track.is_none() {
                debug!("Skipping Web Remote row: {:?}", line);
            }
            track
        })
        .collect()
}
