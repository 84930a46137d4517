//! Parse errors with source rendering and typo suggestions.

use kukicha_base::{Diagnostic, LineIndex, Span, Style};

use crate::suggest::{find_similar, KNOWN_WORDS};

/// A parser diagnostic: what went wrong and where.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// The ways parsing can fail.
#[derive(Debug, Clone)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: String, found: String },
    ExpectedIdentifier { found: String },
    ExpectedExpression { found: String },
    ExpectedType { found: String },
    ExpectedStatement { found: String },
    ExpectedDeclaration { found: String },
    ExpectedBlock,
    ExpectedParameterType { name: String },
    InvalidAssignmentTarget,
    DuplicatePackageDecl,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }

    /// The single-sentence message for this error.
    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                format!("expected {}, found {}", expected, found)
            }
            ParseErrorKind::ExpectedIdentifier { found } => {
                format!("expected an identifier, found {}", found)
            }
            ParseErrorKind::ExpectedExpression { found } => {
                format!("expected an expression, found {}", found)
            }
            ParseErrorKind::ExpectedType { found } => {
                format!("expected a type, found {}", found)
            }
            ParseErrorKind::ExpectedStatement { found } => {
                format!("expected a statement, found {}", found)
            }
            ParseErrorKind::ExpectedDeclaration { found } => {
                format!(
                    "expected a declaration (func, type, interface, var, or import), found {}",
                    found
                )
            }
            ParseErrorKind::ExpectedBlock => {
                "expected an indented block on the next line".to_string()
            }
            ParseErrorKind::ExpectedParameterType { name } => {
                format!("parameter '{}' needs a type annotation", name)
            }
            ParseErrorKind::InvalidAssignmentTarget => {
                "this expression cannot be assigned to".to_string()
            }
            ParseErrorKind::DuplicatePackageDecl => {
                "a file may declare at most one package".to_string()
            }
        }
    }

    /// Converts to the base [`Diagnostic`] used by the pipeline driver.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.message(), self.span)
    }

    /// Renders the error against its source line, with a caret underline and
    /// a typo suggestion when the offending text is close to a known word.
    pub fn display_with_source(&self, source: &str) -> String {
        let index = LineIndex::new(source);
        let (line_num, col) = index.line_col(self.span.start);
        let line_content = index.line_text(source, line_num);
        let col0 = col.saturating_sub(1).min(line_content.len());
        let len = self
            .span
            .len()
            .max(1)
            .min(line_content.len().saturating_sub(col0).max(1));
        let underline = format!("{}{}", " ".repeat(col0), "^".repeat(len));

        let error_label = Style::bold_red("error");
        let line_num_str = Style::blue(&format!("{:4}", line_num));
        let pipe = Style::blue("|");
        let underline_colored = Style::red(&underline);

        let mut result = format!(
            "{}: {}\n\n{} {} {}\n     {} {}",
            error_label,
            self.message(),
            line_num_str,
            pipe,
            line_content,
            pipe,
            underline_colored
        );

        if let Some(word) = self.extract_word(source) {
            if let Some(suggestion) = find_similar(&word, KNOWN_WORDS, 2) {
                let hint = Style::cyan("help");
                result.push_str(&format!(
                    "\n     {} {}: did you mean '{}'?",
                    pipe,
                    hint,
                    Style::green(suggestion)
                ));
            }
        }

        result
    }

    fn extract_word<'a>(&self, source: &'a str) -> Option<&'a str> {
        if self.span.start < source.len() && self.span.end <= source.len() {
            let word = &source[self.span.start..self.span.end];
            if !word.is_empty() && word.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Some(word);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_has_span() {
        let error = ParseError::new(ParseErrorKind::ExpectedBlock, Span::new(5, 10));
        assert_eq!(error.span.start, 5);
        assert_eq!(error.span.end, 10);
    }

    #[test]
    fn message_is_one_sentence() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "':='".to_string(),
                found: "'='".to_string(),
            },
            Span::new(0, 1),
        );
        assert_eq!(error.message(), "expected ':=', found '='");
    }

    #[test]
    fn display_with_source_shows_line_and_underline() {
        let source = "retur x\n";
        let error = ParseError::new(
            ParseErrorKind::ExpectedStatement {
                found: "identifier".to_string(),
            },
            Span::new(0, 5),
        );
        let display = error.display_with_source(source);
        assert!(display.contains("retur"), "{}", display);
        assert!(display.contains("^^^^^"), "{}", display);
    }

    #[test]
    fn display_with_source_suggests_typo_fix() {
        let source = "fucn main()\n";
        let error = ParseError::new(
            ParseErrorKind::ExpectedDeclaration {
                found: "identifier".to_string(),
            },
            Span::new(0, 4),
        );
        let display = error.display_with_source(source);
        assert!(display.contains("did you mean"), "{}", display);
        assert!(display.contains("func"), "{}", display);
    }

    #[test]
    fn to_diagnostic_carries_span_and_message() {
        let error = ParseError::new(ParseErrorKind::InvalidAssignmentTarget, Span::new(3, 8));
        let diag = error.to_diagnostic();
        assert!(diag.is_error());
        assert_eq!(diag.span, Span::new(3, 8));
        assert!(diag.message.contains("assigned"));
    }
}
