use super::*;
use crate::config::PlatformConfig;
use crate::globals::ContextKind;
use modreq_common::diagnostics::diagnostic_codes;
use modreq_parser::{NodeKind, parse_source};

const SOURCEMAP: &str = r#"{
    "name": "Game",
    "className": "DataModel",
    "children": [
        {
            "name": "ReplicatedStorage",
            "className": "ReplicatedStorage",
            "children": [{ "name": "Test", "className": "ModuleScript", "filePaths": ["source.luau"] }]
        },
        {
            "name": "ServerStorage",
            "className": "ServerStorage",
            "children": [
                { "name": "TestModule", "className": "ModuleScript", "filePaths": ["testmodule.luau"] },
                { "name": "SelfRef", "className": "ModuleScript", "filePaths": ["selfref.luau"] }
            ]
        }
    ]
}"#;

struct Fixture {
    platform: Platform,
    globals: GlobalTypes,
    tree: Arc<SourceTree>,
}

impl Fixture {
    fn new() -> Fixture {
        let platform = Platform::new(PlatformConfig::default());
        let tree = platform
            .sourcemap()
            .load_json(SOURCEMAP)
            .expect("valid sourcemap");
        let globals = GlobalTypes::new(ContextKind::Full);
        Fixture {
            platform,
            globals,
            tree,
        }
    }

    fn check_as(&self, script: ScriptInfo, source: &str) -> CheckedModule {
        let parsed = parse_source(&script.file_name, source);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        TypeChecker::new(&self.platform, &self.globals, &self.tree, script, &parsed.arena)
            .check(parsed.root)
    }

    fn check(&self, source: &str) -> CheckedModule {
        self.check_as(ScriptInfo::detached("main.luau"), source)
    }

    /// Formatted result type of every call, in source order.
    fn call_results(&self, module: &CheckedModule) -> Vec<String> {
        module
            .calls
            .iter()
            .map(|record| {
                let ty = module.call_result(record.node).expect("resolved call");
                module.format_type(&self.globals, TypeRef::Module(ty))
            })
            .collect()
    }
}

#[test]
fn test_string_require_resolves_registered_module() {
    let fixture = Fixture::new();
    let module = fixture.check(r#"local X = shared("TestModule")"#);
    assert!(module.diagnostics().is_empty());
    assert_eq!(
        fixture.call_results(&module),
        ["module<game/ServerStorage/TestModule>"]
    );
}

#[test]
fn test_nilable_string_require_is_optional() {
    let fixture = Fixture::new();
    let module = fixture.check(r#"local X = shared("TestModule", true)"#);
    assert!(module.diagnostics().is_empty());
    assert_eq!(
        fixture.call_results(&module),
        ["module<game/ServerStorage/TestModule>?"]
    );
}

#[test]
fn test_nilable_missing_module_is_nil() {
    let fixture = Fixture::new();
    let module = fixture.check(r#"local X = shared("Missing", true)"#);
    assert!(module.diagnostics().is_empty());
    assert_eq!(fixture.call_results(&module), ["nil"]);
}

#[test]
fn test_missing_module_reports_once_at_argument() {
    let fixture = Fixture::new();
    let source = r#"local X = shared("Missing")"#;
    let module = fixture.check(source);
    let diagnostics = module.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, diagnostic_codes::UNKNOWN_REQUIRE);
    assert_eq!(diagnostic.message_text, "Unknown require: Missing");
    assert_eq!(diagnostic.start as usize, source.find("\"Missing\"").unwrap());
    assert_eq!(diagnostic.length, 9);
    assert_eq!(fixture.call_results(&module), ["any"]);
}

#[test]
fn test_false_flag_is_strict() {
    let fixture = Fixture::new();
    let module = fixture.check(r#"local X = shared("Missing", false)"#);
    assert_eq!(module.diagnostics().len(), 1);
}

#[test]
fn test_non_literal_and_empty_calls() {
    let fixture = Fixture::new();
    let module = fixture.check(
        r#"
        local name = "TestModule"
        local A = shared(name)
        local B = shared()
        "#,
    );
    let diagnostics = module.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert!(
        diagnostics
            .iter()
            .all(|d| d.code == diagnostic_codes::UNKNOWN_REQUIRE_UNSUPPORTED_PATH)
    );
}

#[test]
fn test_self_reference_is_reported() {
    let fixture = Fixture::new();
    let script = ScriptInfo::for_file(&fixture.tree, "selfref.luau", std::path::Path::new("selfref.luau"));
    assert!(script.node.is_some());

    let module = fixture.check_as(
        script,
        r#"
        local A = shared("SelfRef")
        local B = shared("SelfRef", true)
        local C = shared("TestModule")
        "#,
    );
    let messages: Vec<_> = module
        .diagnostics()
        .into_iter()
        .map(|d| d.message_text)
        .collect();
    assert_eq!(
        messages,
        ["Unknown require: SelfRef", "Unknown require: SelfRef"]
    );
    assert_eq!(
        fixture.call_results(&module)[2],
        "module<game/ServerStorage/TestModule>"
    );
}

#[test]
fn test_repeated_requires_share_a_handle() {
    let fixture = Fixture::new();
    let module = fixture.check(
        r#"
        local A = shared("TestModule")
        local B = shared("TestModule")
        local C = require(game.ServerStorage.TestModule)
        "#,
    );
    let results: Vec<_> = module
        .calls
        .iter()
        .map(|record| module.call_result(record.node))
        .collect();
    assert_eq!(results.len(), 3);
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_results_live_in_the_module_arena() {
    let fixture = Fixture::new();
    let module = fixture.check(
        r#"
        local A = shared("TestModule")
        local B = shared("Missing", true)
        local C = shared("Missing")
        local f = function() end
        local D = f()
        "#,
    );
    assert_eq!(module.calls.len(), 4);
    for record in &module.calls {
        assert!(module.arena.owns_pack(record.result));
        assert!(module.call_result(record.node).is_some());
    }
}

#[test]
fn test_structural_require() {
    let fixture = Fixture::new();
    let module = fixture.check(
        r#"
        local X = require(game.ReplicatedStorage.Test)
        local Y = require(game.ReplicatedStorage.Nope)
        "#,
    );
    let diagnostics = module.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message_text,
        "Unknown require: game.ReplicatedStorage.Nope"
    );
    assert_eq!(
        fixture.call_results(&module)[0],
        "module<game/ReplicatedStorage/Test>"
    );
}

#[test]
fn test_local_shadowing_the_global() {
    let fixture = Fixture::new();
    let module = fixture.check(
        r#"
        local shared = function(name) return name end
        local X = shared("Missing")
        "#,
    );
    assert!(module.diagnostics().is_empty());
}

#[test]
fn test_disabled_string_requires() {
    let mut config = PlatformConfig::default();
    config.string_require.enabled = false;
    let platform = Platform::new(config);
    let tree = platform.sourcemap().load_json(SOURCEMAP).expect("valid sourcemap");
    let globals = GlobalTypes::new(ContextKind::Full);

    let parsed = parse_source("main.luau", r#"local X = shared("Missing")"#);
    let module = TypeChecker::new(
        &platform,
        &globals,
        &tree,
        ScriptInfo::detached("main.luau"),
        &parsed.arena,
    )
    .check(parsed.root);
    assert!(module.diagnostics().is_empty());
}

#[test]
fn test_callee_is_tagged() {
    let fixture = Fixture::new();
    let parsed = parse_source("main.luau", r#"local X = shared("TestModule")"#);
    let module = TypeChecker::new(
        &fixture.platform,
        &fixture.globals,
        &fixture.tree,
        ScriptInfo::detached("main.luau"),
        &parsed.arena,
    )
    .check(parsed.root);

    let call = parsed
        .arena
        .iter()
        .find(|(_, node)| matches!(node.kind, NodeKind::Call { .. }))
        .map(|(index, _)| index)
        .expect("call node");
    let record = module.call(call).expect("call record");
    let info = module
        .callee_info(&fixture.globals, record.callee)
        .expect("function callee");
    assert!(info.has_tag(modreq_solver::REQUIRE_TAG));
    assert!(info.has_tag(modreq_solver::STRING_REQUIRES_TAG));
}

#[test]
fn test_script_from_an_older_tree_is_anchored() {
    let fixture = Fixture::new();
    let script = ScriptInfo::for_file(&fixture.tree, "selfref.luau", std::path::Path::new("selfref.luau"));
    assert_eq!(script.clone().anchored(&fixture.tree), script);

    let reordered = SourceTree::from_json(
        r#"{
            "name": "Game",
            "className": "DataModel",
            "children": [{
                "name": "ServerStorage",
                "className": "ServerStorage",
                "children": [
                    { "name": "SelfRef", "className": "ModuleScript", "filePaths": ["selfref.luau"] },
                    { "name": "TestModule", "className": "ModuleScript", "filePaths": ["testmodule.luau"] }
                ]
            }]
        }"#,
        2,
    )
    .expect("valid sourcemap");
    let anchored = script.clone().anchored(&reordered);
    assert_ne!(anchored.node, script.node);
    assert_eq!(anchored.node, reordered.find_module("SelfRef").map(|node| node.id));

    let empty = SourceTree::empty(3);
    assert_eq!(script.anchored(&empty).node, None);
    let detached = ScriptInfo::detached("main.luau");
    assert_eq!(detached.clone().anchored(&empty), detached);
}
