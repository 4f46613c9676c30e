//! Diagnostic types and message lookup.
//!
//! Both checking backends and the script parser report through these types.
//! Message templates use `{0}`, `{1}`, ... placeholders filled by
//! [`format_message`].

use serde::Serialize;

use crate::Span;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A diagnostic message with its location in a script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a diagnostic from a registered code, filling the template with `args`.
    ///
    /// Unknown codes fall back to the joined arguments as the message text.
    #[must_use]
    pub fn from_code(file: impl Into<String>, span: Span, code: u32, args: &[&str]) -> Self {
        let (message_text, category) = match get_diagnostic_message(code) {
            Some(m) => (format_message(m.message, args), m.category),
            None => (args.join(" "), DiagnosticCategory::Error),
        };
        Self {
            file: file.into(),
            start: span.start,
            length: span.len(),
            message_text,
            category,
            code,
        }
    }

    /// The byte span this diagnostic covers.
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.start + self.length)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    /// A require-like call named a module that cannot be resolved.
    pub const UNKNOWN_REQUIRE: u32 = 1000;
    /// A require-like call whose argument shape cannot name a module at all.
    pub const UNKNOWN_REQUIRE_UNSUPPORTED_PATH: u32 = 1001;
    /// The script parser could not make sense of a token.
    pub const UNEXPECTED_TOKEN: u32 = 1100;
    /// A string literal runs to the end of its line or file.
    pub const UNTERMINATED_STRING: u32 = 1101;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::UNKNOWN_REQUIRE,
        category: DiagnosticCategory::Error,
        message: "Unknown require: {0}",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNKNOWN_REQUIRE_UNSUPPORTED_PATH,
        category: DiagnosticCategory::Error,
        message: "Unknown require: unsupported path",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNEXPECTED_TOKEN,
        category: DiagnosticCategory::Error,
        message: "Expected {0}, got '{1}'",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNTERMINATED_STRING,
        category: DiagnosticCategory::Error,
        message: "Unterminated string literal",
    },
];

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
