use super::*;
use modreq_common::Position;

const SOURCEMAP: &str = r#"{
    "name": "Game",
    "className": "DataModel",
    "children": [
        {
            "name": "ReplicatedStorage",
            "className": "ReplicatedStorage",
            "children": [
                { "name": "ModuleA", "className": "ModuleScript", "filePaths": ["src/modulea.luau"] },
                { "name": "ModuleB", "className": "ModuleScript", "filePaths": ["src/moduleb.luau"] },
                { "name": "Folder", "className": "Folder" }
            ]
        }
    ]
}"#;

fn workspace() -> Workspace {
    let workspace = Workspace::new("/workspace", PlatformConfig::default());
    workspace.load_sourcemap(SOURCEMAP).expect("valid sourcemap");
    workspace
}

#[test]
fn test_link_range_covers_the_first_argument() {
    let mut workspace = workspace();
    workspace.open_document("main.luau", "local B = shared(\"ModuleB\")\n");

    let links = workspace.document_link("main.luau");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].range.start, Position::new(0, 17));
    assert_eq!(links[0].range.end, Position::new(0, 26));
    assert_eq!(links[0].target, "file:///workspace/src/moduleb.luau");
    assert_eq!(links[0].tooltip.as_deref(), Some("Open module 'ModuleB'"));
}

#[test]
fn test_unresolved_and_fileless_targets_have_no_links() {
    let mut workspace = workspace();
    workspace.open_document(
        "main.luau",
        r#"
        local A = shared("Missing")
        local B = require(game.ReplicatedStorage.Folder)
        local C = print("ModuleA")
        "#,
    );
    assert!(workspace.document_link("main.luau").is_empty());
    assert_eq!(workspace.diagnostics("main.luau").len(), 1);
}

#[test]
fn test_no_self_link_inside_the_tree() {
    let mut workspace = workspace();
    workspace.open_document(
        "src/modulea.luau",
        r#"
        local A = shared("ModuleA")
        local B = shared("ModuleB")
        "#,
    );
    let links = workspace.document_link("src/modulea.luau");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, workspace.resolve_uri("src/moduleb.luau"));

    let diagnostics = workspace.diagnostics("src/modulea.luau");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unknown require: ModuleA");
}

#[test]
fn test_checks_are_cached_until_reload() {
    let mut workspace = workspace();
    workspace.open_document("main.luau", r#"local B = shared("ModuleB")"#);

    let first = workspace
        .check_document("main.luau", ContextKind::Full)
        .map(|module| module.calls[0].callee);
    let again = workspace
        .check_document("main.luau", ContextKind::Full)
        .map(|module| module.calls[0].callee);
    assert_eq!(first, again);
    assert_eq!(workspace.platform().stats().snapshot().constructions, 1);

    workspace
        .load_sourcemap(r#"{ "name": "Game", "className": "DataModel" }"#)
        .expect("valid sourcemap");
    assert!(workspace.document_link("main.luau").is_empty());
    assert_eq!(workspace.diagnostics("main.luau").len(), 1);
}

#[test]
fn test_reordered_reload_rechecks_against_the_new_tree() {
    let mut workspace = workspace();
    workspace.open_document(
        "src/modulea.luau",
        r#"
        local A = shared("ModuleA")
        local B = shared("ModuleB")
        "#,
    );
    assert_eq!(workspace.document_link("src/modulea.luau").len(), 1);

    workspace
        .load_sourcemap(
            r#"{
                "name": "Game",
                "className": "DataModel",
                "children": [{
                    "name": "ReplicatedStorage",
                    "className": "ReplicatedStorage",
                    "children": [
                        { "name": "ModuleB", "className": "ModuleScript", "filePaths": ["lib/moduleb.luau"] },
                        { "name": "ModuleA", "className": "ModuleScript", "filePaths": ["src/modulea.luau"] }
                    ]
                }]
            }"#,
        )
        .expect("valid sourcemap");

    let links = workspace.document_link("src/modulea.luau");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, workspace.resolve_uri("lib/moduleb.luau"));
    let diagnostics = workspace.diagnostics("src/modulea.luau");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unknown require: ModuleA");
}

#[test]
fn test_contexts_are_checked_separately() {
    let mut workspace = workspace();
    workspace.open_document("main.luau", r#"local B = shared("ModuleB")"#);

    let full = workspace
        .check_document("main.luau", ContextKind::Full)
        .map(|module| module.context);
    let autocomplete = workspace
        .check_document("main.luau", ContextKind::Autocomplete)
        .map(|module| module.context);
    assert_eq!(full, Some(workspace.globals(ContextKind::Full).id()));
    assert_eq!(
        autocomplete,
        Some(workspace.globals(ContextKind::Autocomplete).id())
    );
    assert_ne!(full, autocomplete);
}

#[test]
fn test_parse_errors_are_reported() {
    let mut workspace = workspace();
    workspace.open_document("main.luau", "local = shared(\"ModuleB\")");
    let diagnostics = workspace.diagnostics("main.luau");
    assert!(!diagnostics.is_empty());
    assert_eq!(diagnostics[0].code, modreq_common::diagnostics::diagnostic_codes::UNEXPECTED_TOKEN);
}

#[test]
fn test_unknown_documents() {
    let mut workspace = workspace();
    assert!(workspace.check_document("nope.luau", ContextKind::Full).is_none());
    assert!(workspace.diagnostics("nope.luau").is_empty());
    assert!(workspace.document_link("nope.luau").is_empty());

    workspace.open_document("main.luau", "");
    assert_eq!(workspace.document_count(), 1);
    assert!(workspace.close_document("main.luau"));
    assert!(!workspace.close_document("main.luau"));
}
