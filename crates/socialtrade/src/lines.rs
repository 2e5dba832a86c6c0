//! Splitting raw export text into trimmed logical lines.

use std::io::ErrorKind;
use std::path::Path;

use crate::types::{ExportError, ExportResult};

/// One trimmed line of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based position in the source text.
    pub number: usize,
    pub text: &'a str,
}

impl Line<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split `text` into trimmed lines.
///
/// Blank lines are kept so positional header detection still lines up with
/// the source; content parsers skip them with [`Line::is_blank`].
pub fn tokenize(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, raw)| Line {
            number: i + 1,
            text: raw.trim(),
        })
        .collect()
}

/// Decode export bytes, replacing invalid UTF-8 rather than failing.
pub fn decode(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if matches!(text, std::borrow::Cow::Owned(_)) {
        tracing::warn!("Export contains invalid UTF-8; replaced undecodable bytes");
    }
    text
}

/// Read an export file as text. A missing file is [`ExportError::FileNotFound`].
pub fn read_text(path: &Path) -> ExportResult<String> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(decode(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ExportError::FileNotFound(path.to_path_buf()))
        }
        Err(source) => Err(ExportError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
