use super::*;
use modreq_common::diagnostics::diagnostic_codes;
use modreq_common::{Position, Span};

#[test]
fn test_convert_unknown_require() {
    let source = "local A = 1\nlocal X = shared(\"Missing\")\n";
    let start = source.find("\"Missing\"").unwrap() as u32;
    let diag = Diagnostic::from_code(
        "main.luau",
        Span::new(start, start + 9),
        diagnostic_codes::UNKNOWN_REQUIRE,
        &["Missing"],
    );

    let lsp = convert_diagnostic(&diag, &LineMap::build(source), source);
    assert_eq!(lsp.range.start, Position::new(1, 17));
    assert_eq!(lsp.range.end, Position::new(1, 26));
    assert_eq!(lsp.severity, DiagnosticSeverity::Error);
    assert_eq!(lsp.code, 1000);
    assert_eq!(lsp.message, "Unknown require: Missing");
}

#[test]
fn test_serialized_shape() {
    let source = "shared()";
    let diag = Diagnostic::from_code(
        "main.luau",
        Span::new(0, 8),
        diagnostic_codes::UNKNOWN_REQUIRE_UNSUPPORTED_PATH,
        &[],
    );
    let json = serde_json::to_value(convert_diagnostic(&diag, &LineMap::build(source), source))
        .expect("serializable");
    assert_eq!(json["severity"], 1);
    assert_eq!(json["source"], "modreq");
    assert_eq!(json["range"]["end"]["character"], 8);
}
