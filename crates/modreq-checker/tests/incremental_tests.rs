use super::*;
use crate::config::PlatformConfig;
use crate::globals::ContextKind;
use modreq_common::diagnostics::diagnostic_codes;
use modreq_parser::{ParseResult, parse_source};

const SOURCEMAP: &str = r#"{
    "name": "Game",
    "className": "DataModel",
    "children": [
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

    fn generate(&self, script: ScriptInfo, parsed: &ParseResult) -> (CheckedModule, Vec<Constraint>) {
        ConstraintGenerator::new(&self.platform, &self.globals, &self.tree, script, &parsed.arena)
            .generate(parsed.root)
    }

    fn check_as(&self, script: ScriptInfo, source: &str) -> CheckedModule {
        let parsed = parse_source(&script.file_name, source);
        let (module, constraints) = self.generate(script, &parsed);
        ConstraintSolver::new(&self.globals, module).solve(constraints)
    }

    fn check(&self, source: &str) -> CheckedModule {
        self.check_as(ScriptInfo::detached("main.luau"), source)
    }

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
fn test_generator_defers_every_call() {
    let fixture = Fixture::new();
    let parsed = parse_source(
        "main.luau",
        r#"
        local A = shared("TestModule")
        local B = shared("Missing")
        "#,
    );
    let (module, constraints) = fixture.generate(ScriptInfo::detached("main.luau"), &parsed);

    assert!(module.errors.is_empty());
    assert_eq!(module.calls.len(), 2);
    assert_eq!(constraints.len(), 4);
    assert_eq!(constraints[0], Constraint::FunctionCall { call: 0 });
    assert!(matches!(constraints[1], Constraint::Unpack { .. }));
    for record in &module.calls {
        assert!(module.arena.pack_types(record.result).is_none());
    }
}

#[test]
fn test_string_require_binds_the_result_pack() {
    let fixture = Fixture::new();
    let module = fixture.check(r#"local X = shared("TestModule")"#);
    assert!(module.diagnostics().is_empty());
    assert_eq!(
        fixture.call_results(&module),
        ["module<game/ServerStorage/TestModule>"]
    );
}

#[test]
fn test_locals_see_the_unpacked_result() {
    let fixture = Fixture::new();
    let parsed = parse_source(
        "main.luau",
        r#"
        local X = shared("TestModule", true)
        local Y = X
        "#,
    );
    let (module, constraints) = fixture.generate(ScriptInfo::detached("main.luau"), &parsed);
    let module = ConstraintSolver::new(&fixture.globals, module).solve(constraints);

    let y_value = parsed
        .arena
        .iter()
        .filter_map(|(index, node)| match &node.kind {
            modreq_parser::NodeKind::Identifier { name } if name == "X" => Some(index),
            _ => None,
        })
        .last()
        .expect("identifier X");
    let ty = module.type_of(y_value).expect("typed identifier");
    assert_eq!(
        module.format_type(&fixture.globals, ty),
        "module<game/ServerStorage/TestModule>?"
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
fn test_failures_report_once_and_fall_back_to_any() {
    let fixture = Fixture::new();
    let module = fixture.check(
        r#"
        local A = shared("Missing")
        local B = shared(A)
        "#,
    );
    let codes: Vec<_> = module.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        [
            diagnostic_codes::UNKNOWN_REQUIRE,
            diagnostic_codes::UNKNOWN_REQUIRE_UNSUPPORTED_PATH
        ]
    );
    assert_eq!(fixture.call_results(&module), ["any", "any"]);
}

#[test]
fn test_self_reference_is_reported() {
    let fixture = Fixture::new();
    let script = ScriptInfo::for_file(&fixture.tree, "selfref.luau", std::path::Path::new("selfref.luau"));
    let module = fixture.check_as(script, r#"local A = shared("SelfRef", true)"#);
    let diagnostics = module.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message_text, "Unknown require: SelfRef");
}

#[test]
fn test_backends_agree() {
    let fixture = Fixture::new();
    let source = r#"
        local A = shared("TestModule")
        local B = shared("TestModule", true)
        local C = shared("Missing", true)
        local D = shared("Missing")
        local E = require(game.ServerStorage.TestModule)
        local F = require(game.ServerStorage.Nope)
    "#;
    let parsed = parse_source("main.luau", source);

    let eager = crate::check_module(
        &fixture.platform,
        &fixture.globals,
        &fixture.tree,
        ScriptInfo::detached("main.luau"),
        &parsed,
        SolverKind::Eager,
    );
    let incremental = crate::check_module(
        &fixture.platform,
        &fixture.globals,
        &fixture.tree,
        ScriptInfo::detached("main.luau"),
        &parsed,
        SolverKind::Incremental,
    );

    assert_eq!(eager.diagnostics(), incremental.diagnostics());
    assert_eq!(fixture.call_results(&eager), fixture.call_results(&incremental));
    assert_eq!(incremental.solver, SolverKind::Incremental);
}
