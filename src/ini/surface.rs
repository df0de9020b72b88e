//! Control surface entries (`csurf_N=...` lines).
//!
//! The value of a control surface line is a whitespace separated list whose
//! first token names the surface type. Two types are the Web Remote:
//!
//! ```text
//! csurf_0=HTTP 1 8080 '' 'index.html' 0 ''       # current: <flag> <port> ...
//! csurf_1=WEBR 0 0 0 0 0 0 - - - - - 9000        # legacy:  <flag> ... <port>
//! ```
//!
//! Every other type (MCU, OSCII, ...) is carried as [`SurfaceKind::Unknown`].

use serde::{Serialize, Serializer};
use std::fmt;

/// Key prefix shared by all control surface lines
pub const SURFACE_PREFIX: &str = "csurf_";

/// Directive REAPER keeps at the highest assigned surface id
pub const SURFACE_MAX_ID_KEY: &str = "csurf_cnt";

/// Control surface type, taken from the first token of the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceKind {
    /// `HTTP <enabled> <port> ...`
    Http,
    /// Legacy `WEBR <enabled> ... <port>`
    Webr,
    /// Any other surface type, with its tag
    Unknown(String),
}

impl SurfaceKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "HTTP" => SurfaceKind::Http,
            "WEBR" => SurfaceKind::Webr,
            other => SurfaceKind::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            SurfaceKind::Http => "HTTP",
            SurfaceKind::Webr => "WEBR",
            SurfaceKind::Unknown(tag) => tag,
        }
    }

    pub fn is_web_remote(&self) -> bool {
        matches!(self, SurfaceKind::Http | SurfaceKind::Webr)
    }

    /// Port token for this layout. `fields` excludes the type tag.
    fn port_token<'a>(&self, fields: &'a [String]) -> Option<&'a str> {
        match self {
            SurfaceKind::Http => fields.get(1).map(String::as_str),
            SurfaceKind::Webr => fields.last().map(String::as_str),
            SurfaceKind::Unknown(_) => None,
        }
    }

    /// Interpret the enabled-flag token. Both layouts accept `1` or `true`.
    fn flag_is_enabled(&self, token: &str) -> bool {
        self.is_web_remote() && matches!(token, "1" | "true")
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for SurfaceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// One parsed `csurf_N=...` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSurfaceEntry {
    /// `N` from the `csurf_N` key
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: SurfaceKind,
    /// Tokens after the type tag
    pub fields: Vec<String>,
    /// Untouched value text
    pub raw: String,
}

impl ControlSurfaceEntry {
    /// Parse a line value. Returns `None` for an empty value.
    pub fn parse(id: u32, value: &str) -> Option<Self> {
        let mut tokens = value.split_ascii_whitespace();
        let kind = SurfaceKind::from_tag(tokens.next()?);
        Some(Self {
            id,
            kind,
            fields: tokens.map(str::to_string).collect(),
            raw: value.to_string(),
        })
    }

    /// Decode the Web Remote settings carried by this entry.
    ///
    /// Returns `None` for other surface types, and for Web Remote entries
    /// that are too short or whose port is not a valid TCP port.
    pub fn web_remote(&self) -> Option<WebRemoteConfig> {
        if !self.kind.is_web_remote() || self.fields.len() < 2 {
            return None;
        }

        let port = parse_port(self.kind.port_token(&self.fields)?)?;
        let enabled = self.kind.flag_is_enabled(&self.fields[0]);

        Some(WebRemoteConfig {
            port,
            enabled,
            csurf_id: self.id,
            raw: self.raw.clone(),
        })
    }
}

/// Web Remote settings derived from a control surface entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebRemoteConfig {
    pub port: u16,
    pub enabled: bool,
    /// Id of the `csurf_N` entry this was read from
    pub csurf_id: u32,
    /// The entry's raw value
    pub raw: String,
}

impl WebRemoteConfig {
    /// Base URL of the Web Remote on this machine
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Value for a new `HTTP` entry, in the layout REAPER writes itself
pub fn http_entry_value(port: u16, enabled: bool) -> String {
    format!(
        "HTTP {} {} '' 'index.html' 0 ''",
        if enabled { 1 } else { 0 },
        port
    )
}

fn parse_port(token: &str) -> Option<u16> {
    token.parse::<u16>().ok().filter(|port| *port != 0)
}

/// Replace the `n`th whitespace separated token of `text`, keeping all
/// other bytes (including spacing) as they were.
pub(crate) fn replace_token(text: &[u8], n: usize, replacement: &[u8]) -> Option<Vec<u8>> {
    let (start, end) = token_spans(text).nth(n)?;
    let mut out = Vec::with_capacity(text.len() + replacement.len());
    out.extend_from_slice(&text[..start]);
    out.extend_from_slice(replacement);
    out.extend_from_slice(&text[end..]);
    Some(out)
}

fn token_spans(text: &[u8]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut start: Option<usize> = None;
    let mut bytes = text
        .iter()
        .copied()
        .enumerate()
        .chain(std::iter::once((text.len(), b' ')));
    std::iter::from_fn(move || {
        for (i, b) in bytes.by_ref() {
            match (b.is_ascii_whitespace(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    start = None;
                    return Some((s, i));
                }
                _ => {}
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_entry() {
        let entry = ControlSurfaceEntry::parse(0, "HTTP 1 2307 '' 'index.html' 0 ''").unwrap();
        assert_eq!(entry.kind, SurfaceKind::Http);
        assert_eq!(entry.fields.len(), 6);

        let config = entry.web_remote().unwrap();
        assert_eq!(config.port, 2307);
        assert!(config.enabled);
        assert_eq!(config.csurf_id, 0);
        assert_eq!(config.base_url(), "http://localhost:2307");
    }

    #[test]
    fn test_parse_webr_entry_uses_last_field() {
        let entry = ControlSurfaceEntry::parse(4, "WEBR 0 0 0 0 0 0 - - - - - 9000").unwrap();
        let config = entry.web_remote().unwrap();
        assert_eq!(config.port, 9000);
        assert!(!config.enabled);
        assert_eq!(config.csurf_id, 4);
    }

    #[test]
    fn test_enabled_flag_accepts_one_or_true() {
        let http = ControlSurfaceEntry::parse(0, "HTTP true 2307").unwrap();
        assert!(http.web_remote().unwrap().enabled);

        let http = ControlSurfaceEntry::parse(0, "HTTP TRUE 2307").unwrap();
        assert!(!http.web_remote().unwrap().enabled);

        let webr = ControlSurfaceEntry::parse(0, "WEBR true 8080").unwrap();
        assert!(webr.web_remote().unwrap().enabled);

        let webr = ControlSurfaceEntry::parse(0, "WEBR yes 8080").unwrap();
        assert!(!webr.web_remote().unwrap().enabled);
    }

    #[test]
    fn test_unknown_and_malformed_entries() {
        let mcu = ControlSurfaceEntry::parse(1, "MCU 0 0 'X-Touch' 0 0").unwrap();
        assert_eq!(mcu.kind, SurfaceKind::Unknown("MCU".to_string()));
        assert!(mcu.web_remote().is_none());

        assert!(ControlSurfaceEntry::parse(2, "HTTP 1").unwrap().web_remote().is_none());
        assert!(ControlSurfaceEntry::parse(2, "HTTP 1 port").unwrap().web_remote().is_none());
        assert!(ControlSurfaceEntry::parse(2, "HTTP 1 0").unwrap().web_remote().is_none());
        assert!(ControlSurfaceEntry::parse(2, "HTTP 1 70000").unwrap().web_remote().is_none());
        assert!(ControlSurfaceEntry::parse(3, "   ").is_none());
    }

    #[test]
    fn test_http_entry_value() {
        assert_eq!(http_entry_value(8080, true), "HTTP 1 8080 '' 'index.html' 0 ''");
        let entry = ControlSurfaceEntry::parse(0, &http_entry_value(9001, false)).unwrap();
        assert_eq!(entry.web_remote().unwrap().port, 9001);
    }

    #[test]
    fn test_replace_token_keeps_spacing() {
        assert_eq!(
            replace_token(b"HTTP  0   8080 ''  'index.html'", 1, b"1").as_deref(),
            Some(&b"HTTP  1   8080 ''  'index.html'"[..])
        );
        assert_eq!(replace_token(b"WEBR 0", 1, b"1").as_deref(), Some(&b"WEBR 1"[..]));
        assert_eq!(replace_token(b"WEBR", 1, b"1"), None);
        assert_eq!(
            replace_token(b"HTTP 0 8080 '\xFA'", 1, b"1").as_deref(),
            Some(&b"HTTP 1 8080 '\xFA'"[..])
        );
    }

    #[test]
    fn test_serialize_entry() {
        let entry = ControlSurfaceEntry::parse(3, "OSCII 1 x").unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "OSCII");
        assert_eq!(json["id"], 3);
    }
}
