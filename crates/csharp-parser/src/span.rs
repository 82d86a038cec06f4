//! Byte spans and line/column lookup for parse diagnostics.

use std::fmt;
use text_size::{TextRange, TextSize};

/// A half-open byte range `[start, end)` into the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: TextSize,
    /// The end byte offset (exclusive).
    pub end: TextSize,
}

impl Span {
    /// Creates a span from two byte offsets.
    #[inline]
    pub fn new(start: impl Into<TextSize>, end: impl Into<TextSize>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates an empty span at `offset`.
    #[inline]
    pub fn empty(offset: impl Into<TextSize>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Slices `source` with this span.
    ///
    /// Returns an empty string when the span falls outside `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        let range: std::ops::Range<usize> = self.to_range().into();
        source.get(range).unwrap_or("")
    }

    /// Converts this span to a `TextRange`.
    #[inline]
    pub fn to_range(self) -> TextRange {
        TextRange::new(self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(
            TextSize::from(range.start as u32),
            TextSize::from(range.end as u32),
        )
    }
}

/// A 1-based line and column, for human-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub col: u32,
}

impl LineCol {
    /// Locates `offset` inside `source`.
    ///
    /// Offsets past the end of `source` resolve to the position after the last character.
    pub fn locate(source: &str, offset: TextSize) -> Self {
        let offset = (u32::from(offset) as usize).min(source.len());
        let mut line = 1;
        let mut col = 1;
        for (i, c) in source.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Self { line, col }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
