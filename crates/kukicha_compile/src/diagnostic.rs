//! Machine-readable diagnostic reports.
//!
//! Editors and CI consume diagnostics as JSON; the text renderer in
//! `kukicha_base` stays the human-facing format. Positions are resolved to
//! file/line/column here so consumers never need the source text.

use kukicha_base::{Diagnostic, LineIndex, Severity};
use serde::Serialize;

/// One diagnostic with its position resolved.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub severity: String,
    pub message: String,
}

/// A whole compilation's diagnostics for one file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub file: String,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
}

impl DiagnosticReport {
    /// Resolves spans against the source and builds the report.
    pub fn new(file: &str, source: &str, diagnostics: &[Diagnostic]) -> Self {
        let index = LineIndex::new(source);
        let resolved: Vec<JsonDiagnostic> = diagnostics
            .iter()
            .map(|d| {
                let (line, column) = index.line_col(d.span.start);
                JsonDiagnostic {
                    file: file.to_string(),
                    line,
                    column,
                    severity: d.severity.to_string(),
                    message: d.message.clone(),
                }
            })
            .collect();
        DiagnosticReport {
            file: file.to_string(),
            errors: diagnostics.iter().filter(|d| d.is_error()).count(),
            warnings: diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .count(),
            diagnostics: resolved,
        }
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kukicha_base::Span;

    #[test]
    fn report_resolves_positions() {
        let source = "func main()\n    print(missing)\n";
        let diagnostics = vec![Diagnostic::error(
            "undefined name 'missing'",
            Span::new(22, 29),
        )];
        let report = DiagnosticReport::new("app.kuki", source, &diagnostics);
        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 0);
        assert_eq!(report.diagnostics[0].line, 2);
        assert_eq!(report.diagnostics[0].severity, "error");
    }

    #[test]
    fn json_round_trips_through_serde() {
        let source = "x := 1\n";
        let diagnostics = vec![Diagnostic::warning("unused variable", Span::new(0, 1))];
        let report = DiagnosticReport::new("app.kuki", source, &diagnostics);
        let json = report.to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["file"], "app.kuki");
        assert_eq!(parsed["warnings"], 1);
        assert_eq!(parsed["diagnostics"][0]["severity"], "warning");
    }
}
