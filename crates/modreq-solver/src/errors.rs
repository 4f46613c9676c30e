//! Type errors reported by the checking backends.

use modreq_common::Span;
use modreq_common::diagnostics::{Diagnostic, diagnostic_codes};

/// What kind of type error occurred.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeErrorKind {
    /// A require-like call whose target could not be resolved. `None` when
    /// the call did not name a module at all (no argument, or an argument
    /// that is not a literal or a path).
    UnknownRequire { module_name: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeError {
    pub location: Span,
    pub kind: TypeErrorKind,
}

impl TypeError {
    pub const fn new(location: Span, kind: TypeErrorKind) -> TypeError {
        TypeError { location, kind }
    }

    pub fn unknown_require(location: Span, module_name: Option<String>) -> TypeError {
        TypeError::new(location, TypeErrorKind::UnknownRequire { module_name })
    }

    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        match &self.kind {
            TypeErrorKind::UnknownRequire {
                module_name: Some(name),
            } => Diagnostic::from_code(
                file,
                self.location,
                diagnostic_codes::UNKNOWN_REQUIRE,
                &[name.as_str()],
            ),
            TypeErrorKind::UnknownRequire { module_name: None } => Diagnostic::from_code(
                file,
                self.location,
                diagnostic_codes::UNKNOWN_REQUIRE_UNSUPPORTED_PATH,
                &[],
            ),
        }
    }
}
