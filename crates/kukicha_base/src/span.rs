//! Source location tracking.
//!
//! A [`Span`] is a contiguous byte-offset range in source text. Every token,
//! AST node, and diagnostic carries one. Byte offsets match Rust's string
//! slicing: `&source[span.start..span.end]` extracts the spanned text.
//!
//! A [`LineIndex`] converts offsets to 1-based line/column pairs. It is built
//! once per source file and shared by diagnostic rendering and the `//line`
//! directives the code generator emits.
//!
//! # Example
//!
//! ```
//! use kukicha_base::{LineIndex, Span};
//!
//! let source = "petiole main\n\nfunc main()\n";
//! let index = LineIndex::new(source);
//! let span = Span::new(14, 18);
//!
//! assert_eq!(&source[span.start..span.end], "func");
//! assert_eq!(index.line_col(span.start), (3, 1));
//! ```

/// A byte-offset range in source text.
///
/// Spans are `Copy` and cheap to pass around. [`Span::merge`] combines the
/// spans of sub-expressions into the span of a compound node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: usize,
    /// Byte offset past the last character (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a span from byte offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a span covering from the start of `self` to the end of `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if this span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Precomputed line-start table for offset → line/column conversion.
///
/// Lines and columns are 1-based. Columns count bytes, matching what the
/// lexer records and what Go's `//line` directives expect.
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Builds the index by scanning the source once for newlines.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex {
            line_starts,
            len: source.len(),
        }
    }

    /// Returns the 1-based (line, column) of a byte offset.
    ///
    /// Offsets past the end of the source resolve to the last line.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }

    /// Returns the 1-based line of a byte offset.
    pub fn line(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }

    /// Returns the source slice of the 1-based line, without its newline.
    pub fn line_text<'s>(&self, source: &'s str, line: usize) -> &'s str {
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|&next| next - 1)
            .unwrap_or(source.len());
        &source[start..end.max(start)]
    }

    /// Returns the number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
