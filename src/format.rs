//! Plain-text rendering of Web Remote settings, surfaces and tracks.
//!
//! Everything here is pure; colouring for the terminal happens in the CLI.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::ini::{ControlSurfaceEntry, WebRemoteConfig};
use crate::telemetry::Track;

/// Pan values closer to zero than this render as centre
pub const PAN_CENTER_EPSILON: f64 = 0.01;

const NAME_WIDTH: usize = 23;

/// `Center`, `L30%` or `R100%`
pub fn format_pan(pan: f64) -> String {
    if pan < -PAN_CENTER_EPSILON {
        format!("L{:.0}%", pan.abs() * 100.0)
    } else if pan > PAN_CENTER_EPSILON {
        format!("R{:.0}%", pan.abs() * 100.0)
    } else {
        "Center".to_string()
    }
}

/// Cut `s` to at most `max_chars` characters, ending in `...` when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

pub fn format_tracks_table(tracks: &[Track]) -> String {
    if tracks.is_empty() {
        return "No tracks found in REAPER project".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Found {} tracks:\n", tracks.len());
    out.push_str("Index | Name                    | Volume  | Pan    | M | S | R\n");
    out.push_str("------|-------------------------|---------|--------|---|---|---\n");

    for track in tracks {
        let flag = |on: bool, c: char| if on { c } else { ' ' };
        let _ = writeln!(
            out,
            "{:<5} | {:<width$} | {:6.1}dB | {:<6} | {} | {} | {}",
            track.index,
            truncate(&track.name, NAME_WIDTH),
            track.volume_db,
            format_pan(track.pan),
            flag(track.mute, 'M'),
            flag(track.solo, 'S'),
            flag(track.rec_arm, 'R'),
            width = NAME_WIDTH,
        );
    }

    out.push_str("\nLegend: M=Muted, S=Solo, R=Record Armed");
    out
}

pub fn format_track_names(names: &[String]) -> String {
    if names.is_empty() {
        return "No tracks found in REAPER project".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Found {} tracks:\n", names.len());
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, name);
    }
    out
}

pub fn format_web_remote_config(config: &WebRemoteConfig) -> String {
    let mut out = String::new();
    out.push_str("REAPER Web Remote\n");
    let _ = writeln!(out, "  Port:    {}", config.port);
    let _ = writeln!(
        out,
        "  Enabled: {}",
        if config.enabled { "yes" } else { "no" }
    );
    let _ = writeln!(out, "  Entry:   csurf_{}", config.csurf_id);
    let _ = writeln!(out, "  URL:     {}", config.base_url());
    let _ = write!(out, "  Raw:     {}", config.raw);
    out
}

pub fn format_surfaces(entries: &[ControlSurfaceEntry]) -> String {
    if entries.is_empty() {
        return "No control surfaces configured in reaper.ini".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Found {} control surfaces:\n", entries.len());
    out.push_str("ID    | Type  | Web Remote | Fields\n");
    out.push_str("------|-------|------------|-------\n");
    for entry in entries {
        let remote = match entry.web_remote() {
            Some(config) if config.enabled => format!("port {}", config.port),
            Some(config) => format!("port {} off", config.port),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<5} | {:<5} | {:<10} | {}",
            entry.id,
            entry.kind.tag(),
            remote,
            entry.fields.join(" ")
        );
    }
    out
}

pub fn format_project_info(info: &BTreeMap<String, String>) -> String {
    if info.is_empty() {
        return "REAPER Web Remote returned no project information".to_string();
    }

    let width = info.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    info.iter()
        .map(|(key, value)| format!("{:<width$}  {}", key, value.replace('\t', " "), width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(index: i32, name: &str, volume_db: f64, pan: f64) -> Track {
        Track {
            index,
            name: name.to_string(),
            volume_db,
            pan,
            mute: false,
            solo: false,
            rec_arm: false,
        }
    }

    #[test]
    fn test_format_pan() {
        assert_eq!(format_pan(0.0), "Center");
        assert_eq!(format_pan(0.005), "Center");
        assert_eq!(format_pan(-0.01), "Center");
        assert_eq!(format_pan(-0.3), "L30%");
        assert_eq!(format_pan(1.0), "R100%");
        assert_eq!(format_pan(1.5), "R150%");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Drums", 23), "Drums");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_tracks_table() {
        let mut drums = track(1, "Drums", -6.0206, -0.3);
        drums.mute = true;
        drums.rec_arm = true;
        let table = format_tracks_table(&[track(0, "MASTER", 0.0, 0.0), drums]);

        assert!(table.starts_with("Found 2 tracks:\n\n"));
        assert!(table.contains("0     | MASTER                  |    0.0dB | Center |   |   |  "));
        assert!(table.contains("1     | Drums                   |   -6.0dB | L30%   | M |   | R"));
        assert!(table.ends_with("Legend: M=Muted, S=Solo, R=Record Armed"));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(format_tracks_table(&[]), "No tracks found in REAPER project");
        assert_eq!(format_track_names(&[]), "No tracks found in REAPER project");
        assert!(format_project_info(&BTreeMap::new()).contains("no project information"));
    }

    #[test]
    fn test_track_names() {
        let names = vec!["MASTER".to_string(), "Bass".to_string()];
        assert_eq!(
            format_track_names(&names),
            "Found 2 tracks:\n\n1. MASTER\n2. Bass\n"
        );
    }

    #[test]
    fn test_web_remote_config() {
        let config = WebRemoteConfig {
            port: 2307,
            enabled: false,
            csurf_id: 3,
            raw: "HTTP 0 2307 '' 'index.html' 0 ''".to_string(),
        };
        let text = format_web_remote_config(&config);
        assert!(text.contains("Port:    2307"));
        assert!(text.contains("Enabled: no"));
        assert!(text.contains("csurf_3"));
        assert!(text.contains("http://localhost:2307"));
    }

    #[test]
    fn test_surfaces_table() {
        let entries = vec![
            ControlSurfaceEntry::parse(0, "MCU 0 0 'X-Touch' 0 0").unwrap(),
            ControlSurfaceEntry::parse(1, "HTTP 1 8080 '' 'index.html' 0 ''").unwrap(),
        ];
        let table = format_surfaces(&entries);
        assert!(table.contains("0     | MCU   | -          | 0 0 'X-Touch' 0 0"));
        assert!(table.contains("1     | HTTP  | port 8080  |"));
        assert_eq!(format_surfaces(&[]), "No control surfaces configured in reaper.ini");
    }
}
