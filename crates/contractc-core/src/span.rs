//! Source location tracking for diagnostics and debug info.
//!
//! Provides [`Span`] to track where AST nodes, errors and sequence points
//! come from in the original source documents.

use std::fmt;

/// Identity of a source document within a program.
///
/// Indexes into the program's file list. Debug info deduplicates documents
/// by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A range of source code.
///
/// Lines and columns are 1-indexed. The end position is exclusive, matching
/// what debuggers expect for sequence point ranges.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Document the span belongs to.
    pub file: FileId,
    /// Start line (1-indexed).
    pub line: u32,
    /// Start column (1-indexed).
    pub col: u32,
    /// End line (1-indexed).
    pub end_line: u32,
    /// End column (1-indexed, exclusive).
    pub end_col: u32,
}

impl Span {
    /// Create a new span from a start and end position in a file.
    #[inline]
    pub fn new(file: FileId, line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            file,
            line,
            col,
            end_line,
            end_col,
        }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(file: FileId, line: u32, col: u32) -> Self {
        Self::new(file, line, col, line, col)
    }

    /// Whether this span covers no source text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line == self.end_line && self.col == self.end_col
    }

    /// Span covering the first character of this span.
    ///
    /// Used for block boundary markers (the opening brace).
    #[inline]
    pub fn start(self) -> Span {
        Span::new(self.file, self.line, self.col, self.line, self.col + 1)
    }

    /// Span covering the last character of this span.
    ///
    /// Used for block boundary markers (the closing brace).
    #[inline]
    pub fn end(self) -> Span {
        Span::new(
            self.file,
            self.end_line,
            self.end_col.saturating_sub(1).max(1),
            self.end_line,
            self.end_col.max(2),
        )
    }

    /// Merge two spans into one that covers both.
    ///
    /// Both spans are expected to come from the same file; the file of
    /// `self` is kept.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (line, col) = (self.line, self.col).min((other.line, other.col));
        let (end_line, end_col) = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span {
            file: self.file,
            line,
            col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}:{}:{}-{}:{}",
            self.file.0, self.line, self.col, self.end_line, self.end_col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
