//! Order-preserving, line-oriented view of `reaper.ini`.
//!
//! Lines are kept as raw bytes, so files carrying non-UTF-8 text (such as
//! ANSI encoded project paths) load fine. Only lines explicitly replaced or
//! inserted change on save; everything else round-trips byte for byte (the
//! line terminator of the source file is detected and reused).

use std::borrow::Cow;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};

/// Line terminator used when serialising a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Terminator native to the running platform
    pub fn platform() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

/// A `key=value` line whose key is `<prefix><integer>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedLine<'a> {
    /// Position of the line in the document
    pub index: usize,
    /// Full key, e.g. `csurf_3`
    pub key: &'a str,
    /// Integer suffix of the key
    pub id: u32,
    /// Everything after the first `=`; invalid UTF-8 is replaced
    pub value: Cow<'a, str>,
}

/// In-memory copy of a configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    lines: Vec<Vec<u8>>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl ConfigDocument {
    /// Read a configuration file from disk
    pub async fn load(path: impl AsRef<Path>) -> RemoteResult<Self> {
        let path = path.as_ref();
        let contents = fs::read(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RemoteError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                RemoteError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let document = Self::parse(&contents);
        debug!(
            "Loaded {} lines from {}",
            document.lines.len(),
            path.display()
        );
        Ok(document)
    }

    /// Split file contents into lines, remembering the terminator and
    /// whether the last line was terminated
    pub fn parse(contents: impl AsRef<[u8]>) -> Self {
        let bytes = contents.as_ref();
        let line_ending = if bytes.windows(2).any(|pair| pair == b"\r\n") {
            LineEnding::CrLf
        } else if bytes.contains(&b'\n') {
            LineEnding::Lf
        } else {
            LineEnding::platform()
        };

        let trailing_newline = bytes.ends_with(b"\n");
        let body = if trailing_newline {
            bytes
                .strip_suffix(line_ending.as_bytes())
                .unwrap_or(&bytes[..bytes.len() - 1])
        } else {
            bytes
        };

        let lines = if bytes.is_empty() {
            Vec::new()
        } else {
            split_lines(body, line_ending.as_bytes())
        };

        Self {
            lines,
            line_ending,
            trailing_newline,
        }
    }

    /// Serialise back to the exact bytes to write
    pub fn to_bytes(&self) -> Vec<u8> {
        let terminator = self.line_ending.as_bytes();
        let mut bytes = self.lines.join(terminator);
        if self.trailing_newline && !self.lines.is_empty() {
            bytes.extend_from_slice(terminator);
        }
        bytes
    }

    /// Serialised text, with invalid UTF-8 replaced
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }

    /// Overwrite `path` with the serialised document in a single write
    pub async fn save(&self, path: impl AsRef<Path>) -> RemoteResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())
            .await
            .map_err(|source| RemoteError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Wrote {} lines to {}", self.lines.len(), path.display());
        Ok(())
    }

    /// Line at `index` as text, with invalid UTF-8 replaced
    pub fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        self.lines.get(index).map(|line| String::from_utf8_lossy(line))
    }

    /// Raw bytes of the line at `index`
    pub fn line_bytes(&self, index: usize) -> Option<&[u8]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.lines.iter().map(|line| String::from_utf8_lossy(line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// All `<prefix><integer>=value` lines, in file order.
    ///
    /// Lines starting with the prefix whose key suffix is not an integer
    /// (such as `csurf_cnt`) are skipped.
    pub fn find_lines_with_prefix<'a>(&'a self, prefix: &str) -> Vec<PrefixedLine<'a>> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let (key, value) = split_assignment(line)?;
                let key = std::str::from_utf8(key).ok()?;
                let id = key.strip_prefix(prefix)?.parse::<u32>().ok()?;
                Some(PrefixedLine {
                    index,
                    key,
                    id,
                    value: String::from_utf8_lossy(value),
                })
            })
            .collect()
    }

    /// First line assigning exactly `key`, as `(index, value)`
    pub fn find_key(&self, key: &str) -> Option<(usize, Cow<'_, str>)> {
        self.lines.iter().enumerate().find_map(|(index, line)| {
            let (line_key, value) = split_assignment(line)?;
            (line_key == key.as_bytes()).then(|| (index, String::from_utf8_lossy(value)))
        })
    }

    /// Replace the line at `index`. Out-of-range indices are ignored.
    pub fn replace_line(&mut self, index: usize, line: impl Into<Vec<u8>>) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = line.into();
        }
    }

    /// Insert a new line directly after `index` (clamped to the end)
    pub fn insert_line_after(&mut self, index: usize, line: impl Into<Vec<u8>>) {
        let at = (index + 1).min(self.lines.len());
        self.lines.insert(at, line.into());
    }

    pub fn append_line(&mut self, line: impl Into<Vec<u8>>) {
        self.lines.push(line.into());
    }
}

/// Split a trimmed `key=value` line on its first `=`
fn split_assignment(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let line = line.trim_ascii();
    let eq = line.iter().position(|&b| b == b'=')?;
    Some((&line[..eq], &line[eq + 1..]))
}

fn split_lines(body: &[u8], terminator: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut rest = body;
    while let Some(at) = rest
        .windows(terminator.len())
        .position(|window| window == terminator)
    {
        lines.push(rest[..at].to_vec());
        rest = &rest[at + terminator.len()..];
    }
    lines.push(rest.to_vec());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "[REAPER]\ncsurf_0=MCU 0 0 0\ncsurf_cnt=1\nundomaxmem=200\n";

    #[test]
    fn test_parse_lines() {
        let doc = ConfigDocument::parse(SAMPLE);
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.line(1).unwrap(), "csurf_0=MCU 0 0 0");
        assert_eq!(doc.line_ending(), LineEnding::Lf);
        assert_eq!(doc.to_text(), SAMPLE);
    }

    #[test]
    fn test_crlf_preserved() {
        let text = "[REAPER]\r\ncsurf_0=HTTP 1 8080 '' 'index.html' 0 ''\r\n";
        let doc = ConfigDocument::parse(text);
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
        assert_eq!(doc.line(1).unwrap(), "csurf_0=HTTP 1 8080 '' 'index.html' 0 ''");
        assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn test_empty_document() {
        let mut doc = ConfigDocument::parse("");
        assert!(doc.is_empty());
        assert_eq!(doc.to_text(), "");

        doc.append_line("csurf_cnt=0");
        assert_eq!(doc.to_text(), "csurf_cnt=0");
    }

    #[test]
    fn test_find_lines_with_prefix() {
        let doc = ConfigDocument::parse(
            "csurf_0=MCU 0\n  csurf_2=HTTP 1 8080\ncsurf_x=WEBR 1\ncsurf_cnt=2\ncsurf_5\nfoo=bar\n",
        );
        let found = doc.find_lines_with_prefix("csurf_");

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].index, 0);
        assert_eq!(found[0].id, 0);
        assert_eq!(found[1].index, 1);
        assert_eq!(found[1].key, "csurf_2");
        assert_eq!(found[1].value, "HTTP 1 8080");
    }

    #[test]
    fn test_find_key() {
        let doc = ConfigDocument::parse(SAMPLE);
        let (index, value) = doc.find_key("csurf_cnt").unwrap();
        assert_eq!(index, 2);
        assert_eq!(value, "1");
        assert!(doc.find_key("csurf").is_none());
    }

    #[test]
    fn test_mutations() {
        let mut doc = ConfigDocument::parse("a=1\nb=2\nc=3");
        doc.replace_line(1, "b=20");
        doc.insert_line_after(1, "bb=1");
        doc.insert_line_after(99, "z=1");
        doc.replace_line(99, "ignored");
        assert_eq!(doc.to_text(), "a=1\nb=20\nbb=1\nc=3\nz=1");
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reaper.ini");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut doc = ConfigDocument::load(&path).await.unwrap();
        doc.append_line("extra=1");
        doc.save(&path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("{}extra=1\n", SAMPLE));
    }

    #[tokio::test]
    async fn test_non_utf8_lines_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reaper.ini");
        let original = b"[REAPER]\r\nlastproject=C:\\M\xFAsica\\song.rpp\r\ncsurf_0=HTTP 1 2307 '' 'index.html' 0 ''\r\n";
        std::fs::write(&path, original).unwrap();

        let mut doc = ConfigDocument::load(&path).await.unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.line_bytes(1), Some(&b"lastproject=C:\\M\xFAsica\\song.rpp"[..]));
        let found = doc.find_lines_with_prefix("csurf_");
        assert_eq!(found[0].value, "HTTP 1 2307 '' 'index.html' 0 ''");

        doc.save(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), original);

        doc.append_line("csurf_cnt=0");
        doc.save(&path).await.unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(original));
        assert!(written.ends_with(b"csurf_cnt=0\r\n"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigDocument::load(temp_dir.path().join("nope.ini"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let doc = ConfigDocument::parse(SAMPLE);
        let err = doc
            .save(temp_dir.path().join("missing").join("reaper.ini"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
    }

    proptest! {
        #[test]
        fn prop_unmodified_round_trip(
            lines in prop::collection::vec("[ -~]{0,24}", 0..16),
            crlf in any::<bool>(),
            trailing in any::<bool>(),
        ) {
            let terminator = if crlf { "\r\n" } else { "\n" };
            let mut text = lines.join(terminator);
            if trailing && !lines.is_empty() {
                text.push_str(terminator);
            }

            let doc = ConfigDocument::parse(&text);
            prop_assert_eq!(doc.to_bytes(), text.into_bytes());
        }
    }
}
