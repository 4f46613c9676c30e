use super::*;
use crate::node::NodeKind;

fn parse(source: &str) -> ParseResult {
    parse_source("test.luau", source)
}

fn statements(result: &ParseResult) -> Vec<NodeIndex> {
    match result.arena.kind(result.root) {
        Some(NodeKind::Chunk { statements }) => statements.clone(),
        other => panic!("expected chunk, got {other:?}"),
    }
}

fn calls(result: &ParseResult) -> Vec<NodeIndex> {
    result
        .arena
        .iter()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Call { .. }))
        .map(|(idx, _)| idx)
        .collect()
}

#[test]
fn test_parse_local_with_string_call() {
    let result = parse("local X = shared(\"TestModule\")");
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let stmts = statements(&result);
    assert_eq!(stmts.len(), 1);
    let Some(NodeKind::Local { names, values }) = result.arena.kind(stmts[0]) else {
        panic!("expected local");
    };
    assert_eq!(names, &vec!["X".to_string()]);
    let Some(NodeKind::Call { callee, method, args }) = result.arena.kind(values[0]) else {
        panic!("expected call");
    };
    assert!(method.is_none());
    assert!(matches!(
        result.arena.kind(*callee),
        Some(NodeKind::Identifier { name }) if name == "shared"
    ));
    assert_eq!(result.arena.string_literal(args[0]), Some("TestModule"));
}

#[test]
fn test_parse_call_spans() {
    let source = "local A = shared(\"ModuleB\", true)";
    let result = parse(source);
    let call = calls(&result)[0];
    let span = result.arena.span(call);
    assert_eq!(&source[span.start as usize..span.end as usize], "shared(\"ModuleB\", true)");

    let Some(NodeKind::Call { args, .. }) = result.arena.kind(call) else {
        panic!("expected call");
    };
    let arg_span = result.arena.span(args[0]);
    assert_eq!(&source[arg_span.start as usize..arg_span.end as usize], "\"ModuleB\"");
    assert_eq!(result.arena.boolean_literal(args[1]), Some(true));
}

#[test]
fn test_parse_member_chain_require() {
    let result = parse("local X = require(game.ReplicatedStorage.Test)");
    assert!(result.diagnostics.is_empty());
    let call = calls(&result)[0];
    let Some(NodeKind::Call { args, .. }) = result.arena.kind(call) else {
        panic!("expected call");
    };
    let Some(NodeKind::Member { object, name }) = result.arena.kind(args[0]) else {
        panic!("expected member");
    };
    assert_eq!(name, "Test");
    assert!(matches!(
        result.arena.kind(*object),
        Some(NodeKind::Member { name, .. }) if name == "ReplicatedStorage"
    ));
}

#[test]
fn test_parse_string_call_sugar() {
    let result = parse("shared \"Mod\"");
    assert!(result.diagnostics.is_empty());
    let call = calls(&result)[0];
    let Some(NodeKind::Call { args, .. }) = result.arena.kind(call) else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    assert_eq!(result.arena.string_literal(args[0]), Some("Mod"));
}

#[test]
fn test_parse_method_call() {
    let result = parse("game:GetService(\"Players\")");
    let call = calls(&result)[0];
    assert!(matches!(
        result.arena.kind(call),
        Some(NodeKind::Call { method: Some(m), .. }) if m == "GetService"
    ));
}

#[test]
fn test_parse_nested_blocks() {
    let source = r#"
        local function load(name)
            if name == "a" then
                return shared("A")
            elseif name == "b" then
                return shared("B", true)
            else
                for i = 1, 10 do
                    print(i)
                end
            end
        end
    "#;
    let result = parse(source);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(calls(&result).len(), 3);
    let stmts = statements(&result);
    assert!(matches!(
        result.arena.kind(stmts[0]),
        Some(NodeKind::LocalFunction { name, .. }) if name == "load"
    ));
}

#[test]
fn test_parse_binary_precedence() {
    let result = parse("x = 1 + 2 * 3");
    let stmts = statements(&result);
    let Some(NodeKind::Assign { values, .. }) = result.arena.kind(stmts[0]) else {
        panic!("expected assignment");
    };
    let Some(NodeKind::Binary { op, right, .. }) = result.arena.kind(values[0]) else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        result.arena.kind(*right),
        Some(NodeKind::Binary { op: BinaryOp::Mul, .. })
    ));
}

#[test]
fn test_parse_concat_is_right_associative() {
    let result = parse("x = a .. b .. c");
    let stmts = statements(&result);
    let Some(NodeKind::Assign { values, .. }) = result.arena.kind(stmts[0]) else {
        panic!("expected assignment");
    };
    let Some(NodeKind::Binary { left, right, .. }) = result.arena.kind(values[0]) else {
        panic!("expected binary");
    };
    assert!(matches!(result.arena.kind(*left), Some(NodeKind::Identifier { .. })));
    assert!(matches!(
        result.arena.kind(*right),
        Some(NodeKind::Binary { op: BinaryOp::Concat, .. })
    ));
}

#[test]
fn test_parse_type_annotations_are_skipped() {
    let result = parse("local m: Types.Module? = shared(\"M\")\nlocal t: {number} = {}");
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(statements(&result).len(), 2);
}

#[test]
fn test_parse_function_statement_method() {
    let result = parse("function M.util:run(a, ...) return a end");
    assert!(result.diagnostics.is_empty());
    let stmts = statements(&result);
    let Some(NodeKind::FunctionStatement { function, .. }) = result.arena.kind(stmts[0]) else {
        panic!("expected function statement");
    };
    let Some(NodeKind::Function { params, .. }) = result.arena.kind(*function) else {
        panic!("expected function");
    };
    assert_eq!(params, &vec!["self".to_string(), "a".to_string(), "...".to_string()]);
}

#[test]
fn test_parse_recovers_from_unexpected_token() {
    let result = parse("local = 5\nlocal Y = shared(\"Y\")");
    assert!(!result.diagnostics.is_empty());
    assert_eq!(
        result.diagnostics[0].code,
        modreq_common::diagnostics::diagnostic_codes::UNEXPECTED_TOKEN
    );
    // The following statement still parses.
    assert_eq!(calls(&result).len(), 1);
}

#[test]
fn test_parse_non_call_expression_statement_reports() {
    let result = parse("x");
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.diagnostics[0].message_text.starts_with("Expected '='"));
}

#[test]
fn test_parse_stray_end_reports() {
    let result = parse("end\nprint(1)");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(calls(&result).len(), 1);
}

#[test]
fn test_parse_deep_nesting_is_bounded() {
    let source = format!("x = {}1{}", "(".repeat(500), ")".repeat(500));
    let result = parse(&source);
    assert!(!result.diagnostics.is_empty());
}

#[test]
fn test_parse_scanner_errors_become_diagnostics() {
    let result = parse("local s = \"unterminated\n");
    assert!(result.diagnostics.iter().any(|d| {
        d.code == modreq_common::diagnostics::diagnostic_codes::UNTERMINATED_STRING
    }));
}
