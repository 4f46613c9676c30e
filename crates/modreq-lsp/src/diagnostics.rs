//! LSP diagnostics and conversion from checker diagnostics.

use modreq_common::{Diagnostic, DiagnosticCategory, LineMap, Range};
use serde::Serialize;

const DIAGNOSTIC_SOURCE: &str = "modreq";

/// Diagnostic severity level (matches LSP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl From<DiagnosticSeverity> for u8 {
    fn from(severity: DiagnosticSeverity) -> u8 {
        severity as u8
    }
}

impl From<DiagnosticCategory> for DiagnosticSeverity {
    fn from(category: DiagnosticCategory) -> Self {
        match category {
            DiagnosticCategory::Error => DiagnosticSeverity::Error,
            DiagnosticCategory::Warning => DiagnosticSeverity::Warning,
            DiagnosticCategory::Suggestion => DiagnosticSeverity::Hint,
            DiagnosticCategory::Message => DiagnosticSeverity::Information,
        }
    }
}

/// LSP diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub code: u32,
    pub source: &'static str,
    pub message: String,
}

/// Convert a checker or parser diagnostic to an LSP diagnostic.
pub fn convert_diagnostic(diag: &Diagnostic, line_map: &LineMap, source: &str) -> LspDiagnostic {
    LspDiagnostic {
        range: line_map.span_to_range(diag.span(), source),
        severity: diag.category.into(),
        code: diag.code,
        source: DIAGNOSTIC_SOURCE,
        message: diag.message_text.clone(),
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
