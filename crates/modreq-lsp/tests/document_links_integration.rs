//! Document links for structural and string requires, end to end.

use modreq_checker::PlatformConfig;
use modreq_lsp::Workspace;

fn workspace(sourcemap: &str) -> Workspace {
    let workspace = Workspace::new("/workspace", PlatformConfig::default());
    workspace.load_sourcemap(sourcemap).expect("valid sourcemap");
    workspace
}

#[test]
fn document_link_for_structural_require_path() {
    let mut workspace = workspace(
        r#"{
            "name": "Game",
            "className": "DataModel",
            "children": [
                {
                    "name": "ReplicatedStorage",
                    "className": "ReplicatedStorage",
                    "children": [{ "name": "Test", "className": "ModuleScript", "filePaths": ["source.luau"] }]
                }
            ]
        }"#,
    );
    workspace.open_document(
        "main.luau",
        r#"
        local X = require(game.ReplicatedStorage.Test)
        "#,
    );

    let links = workspace.document_link("main.luau");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, workspace.resolve_uri("source.luau"));
}

#[test]
fn document_link_for_string_require_call() {
    let mut workspace = workspace(
        r#"{
            "name": "Game",
            "className": "DataModel",
            "children": [
                {
                    "name": "ServerStorage",
                    "className": "ServerStorage",
                    "children": [{ "name": "TestModule", "className": "ModuleScript", "filePaths": ["testmodule.luau"] }]
                }
            ]
        }"#,
    );
    workspace.open_document(
        "main.luau",
        r#"
        local X = shared("TestModule")
        "#,
    );

    let links = workspace.document_link("main.luau");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, workspace.resolve_uri("testmodule.luau"));
    assert_eq!(links[0].target, "file:///workspace/testmodule.luau");
}

#[test]
fn document_link_multiple_calls_require_and_string_require() {
    let mut workspace = workspace(
        r#"{
            "name": "Game",
            "className": "DataModel",
            "children": [
                {
                    "name": "ReplicatedStorage",
                    "className": "ReplicatedStorage",
                    "children": [
                        { "name": "ModuleA", "className": "ModuleScript", "filePaths": ["modulea.luau"] },
                        { "name": "ModuleB", "className": "ModuleScript", "filePaths": ["moduleb.luau"] }
                    ]
                }
            ]
        }"#,
    );
    workspace.open_document(
        "main.luau",
        r#"
        local A = require(game.ReplicatedStorage.ModuleA)
        local B = shared("ModuleB")
        "#,
    );

    let links = workspace.document_link("main.luau");
    assert_eq!(links.len(), 2);
    let targets: Vec<_> = links.iter().map(|link| link.target.as_str()).collect();
    assert!(targets.contains(&workspace.resolve_uri("modulea.luau").as_str()));
    assert!(targets.contains(&workspace.resolve_uri("moduleb.luau").as_str()));
}

#[test]
fn nilable_missing_module_has_no_link_and_no_diagnostic() {
    let mut workspace = workspace(
        r#"{
            "name": "Game",
            "className": "DataModel",
            "children": [
                {
                    "name": "ServerStorage",
                    "className": "ServerStorage",
                    "children": [{ "name": "TestModule", "className": "ModuleScript", "filePaths": ["testmodule.luau"] }]
                }
            ]
        }"#,
    );
    workspace.open_document(
        "main.luau",
        r#"
        local X = shared("Missing", true)
        "#,
    );

    assert!(workspace.diagnostics("main.luau").is_empty());
    assert!(workspace.document_link("main.luau").is_empty());
}
