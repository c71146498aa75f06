//! Source buffers
//!
//! Immutable source text plus a precomputed line table, so the lowering pass
//! can map byte offsets to lines for coverage and diagnostics.

use serde::Deserialize;

/// Encoding the source text was declared with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    /// UTF-8 (the default)
    #[default]
    Utf8,
    /// US-ASCII
    UsAscii,
    /// Raw bytes
    Binary,
}

impl SourceEncoding {
    /// Canonical encoding name
    pub fn name(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::UsAscii => "US-ASCII",
            SourceEncoding::Binary => "ASCII-8BIT",
        }
    }
}

/// A named source buffer
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    text: String,
    encoding: SourceEncoding,
    /// Byte offset at which each line starts; line 1 starts at 0
    line_starts: Vec<usize>,
}

impl Source {
    /// Create a UTF-8 source
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_encoding(name, text, SourceEncoding::Utf8)
    }

    /// Create a source with an explicit encoding
    pub fn with_encoding(
        name: impl Into<String>,
        text: impl Into<String>,
        encoding: SourceEncoding,
    ) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            text,
            encoding,
            line_starts,
        }
    }

    /// Source name (usually a path); identifies the source in the coverage table
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full source text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Declared encoding
    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }

    /// 1-based line containing `offset`; offsets past the end map to the last line
    pub fn line(&self, offset: usize) -> u32 {
        let index = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        (index + 1) as u32
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text in `offset..offset + length`, clamped to the buffer and to char boundaries
    pub fn snippet(&self, offset: usize, length: usize) -> &str {
        let mut start = offset.min(self.text.len());
        let mut end = offset.saturating_add(length).min(self.text.len());
        while start > 0 && !self.text.is_char_boundary(start) {
            start -= 1;
        }
        while end < self.text.len() && !self.text.is_char_boundary(end) {
            end += 1;
        }
        &self.text[start..end]
    }
}
