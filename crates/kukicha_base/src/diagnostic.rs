//! Compiler diagnostics with source location tracking.
//!
//! Every phase of the pipeline accumulates [`Diagnostic`]s instead of
//! aborting on the first problem. A diagnostic carries a [`Severity`], a
//! single-sentence message, and the [`Span`] it refers to; file, line, and
//! column are resolved against a [`LineIndex`] when the diagnostic is
//! rendered or exported.
//!
//! # Example
//!
//! ```
//! use kukicha_base::{Diagnostic, LineIndex, Span};
//!
//! let source = "x := fetchData()\n";
//! let diag = Diagnostic::error("undefined function 'fetchData'", Span::new(5, 14));
//!
//! let index = LineIndex::new(source);
//! let rendered = diag.render("app.kuki", source, &index);
//! assert!(rendered.contains("app.kuki:1:6"));
//! assert!(rendered.contains("^^^^^^^^^"));
//! ```

use crate::span::{LineIndex, Span};
use crate::style::Style;
use std::fmt;

/// How serious a diagnostic is.
///
/// Errors block compilation before the next phase; warnings are reported
/// and compilation continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A resolved source position: file, 1-based line, 1-based column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A compiler message attached to a source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span,
        }
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            span,
        }
    }

    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Resolves the diagnostic's start offset to a [`Position`].
    pub fn position(&self, file: &str, index: &LineIndex) -> Position {
        let (line, column) = index.line_col(self.span.start);
        Position {
            file: file.to_string(),
            line,
            column,
        }
    }

    /// Renders the diagnostic with the offending line and a caret underline.
    ///
    /// Format:
    ///
    /// ```text
    /// error: undefined function 'fetchData' at app.kuki:1:6
    ///
    ///    1 | x := fetchData()
    ///        |      ^^^^^^^^^
    /// ```
    pub fn render(&self, file: &str, source: &str, index: &LineIndex) -> String {
        let pos = self.position(file, index);
        let line_text = index.line_text(source, pos.line);
        let col = pos.column.saturating_sub(1).min(line_text.len());
        let len = self
            .span
            .len()
            .max(1)
            .min(line_text.len().saturating_sub(col).max(1));
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));

        let label = match self.severity {
            Severity::Error => Style::bold_red("error"),
            Severity::Warning => Style::bold_yellow("warning"),
        };
        let line_num = Style::blue(&format!("{:4}", pos.line));
        let pipe = Style::blue("|");
        let underline = match self.severity {
            Severity::Error => Style::red(&underline),
            Severity::Warning => Style::yellow(&underline),
        };

        format!(
            "{}: {} at {}\n\n{} {} {}\n     {} {}",
            label, self.message, pos, line_num, pipe, line_text, pipe, underline
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {}..{}",
            self.severity, self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Sorts diagnostics by source position, errors before warnings at the same
/// offset. This is the order the driver reports them in.
pub fn sort_diagnostics(diags: &mut [Diagnostic]) {
    diags.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(b.severity.cmp(&a.severity))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_and_warning_constructors() {
        let e = Diagnostic::error("bad", Span::new(1, 2));
        let w = Diagnostic::warning("iffy", Span::new(3, 4));
        assert!(e.is_error());
        assert!(!w.is_error());
    }

    #[test]
    fn display_includes_offsets() {
        let d = Diagnostic::error("unexpected token", Span::new(5, 10));
        let text = format!("{}", d);
        assert!(text.contains("unexpected token"));
        assert!(text.contains("5..10"));
    }

    #[test]
    fn position_resolves_line_and_column() {
        let source = "petiole main\nfunc main()\n";
        let index = LineIndex::new(source);
        let d = Diagnostic::error("test", Span::new(13, 17));
        let pos = d.position("app.kuki", &index);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.to_string(), "app.kuki:2:1");
    }

    #[test]
    fn render_underlines_the_span() {
        let source = "x := fetchData()\n";
        let index = LineIndex::new(source);
        let d = Diagnostic::error("undefined function", Span::new(5, 14));
        let rendered = d.render("app.kuki", source, &index);
        assert!(rendered.contains("fetchData"), "{}", rendered);
        assert!(rendered.contains("^^^^^^^^^"), "{}", rendered);
        assert!(rendered.contains("\x1b["), "{}", rendered);
    }

    #[test]
    fn sort_orders_by_position_then_severity() {
        let mut diags = vec![
            Diagnostic::warning("later", Span::new(20, 21)),
            Diagnostic::warning("tied warning", Span::new(5, 6)),
            Diagnostic::error("tied error", Span::new(5, 6)),
        ];
        sort_diagnostics(&mut diags);
        assert_eq!(diags[0].message, "tied error");
        assert_eq!(diags[1].message, "tied warning");
        assert_eq!(diags[2].message, "later");
    }
}
