use super::*;

const GAME: &str = r#"{
    "name": "Game",
    "className": "DataModel",
    "children": [
        {
            "name": "ReplicatedStorage",
            "className": "ReplicatedStorage",
            "children": [
                { "name": "ModuleA", "className": "ModuleScript", "filePaths": ["modulea.luau"] },
                {
                    "name": "Shared",
                    "className": "Folder",
                    "children": [
                        { "name": "ModuleA", "className": "ModuleScript", "filePaths": ["shared/modulea.luau"] },
                        { "name": "Util", "className": "ModuleScript", "filePaths": ["util.meta.json", "util.lua"] }
                    ]
                }
            ]
        },
        {
            "name": "ServerScriptService",
            "className": "ServerScriptService",
            "children": [{ "name": "Main", "className": "Script", "filePaths": ["main.server.luau"] }]
        }
    ]
}"#;

fn game() -> SourceTree {
    SourceTree::from_json(GAME, 1).expect("valid sourcemap")
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_virtual_paths_for_data_model() {
    let tree = game();
    assert_eq!(tree.root().map(|n| n.virtual_path.as_str()), Some("game"));
    let util = tree.find_module("Util").expect("Util registered");
    assert_eq!(util.virtual_path, "game/ReplicatedStorage/Shared/Util");
    assert!(tree.find_by_virtual_path("game/ServerScriptService/Main").is_some());
}

#[test]
fn test_virtual_paths_for_project_root() {
    let tree = SourceTree::from_json(
        r#"{ "name": "MyLib", "className": "ModuleScript", "filePaths": ["init.luau"] }"#,
        1,
    )
    .expect("valid sourcemap");
    assert_eq!(tree.root().map(|n| n.virtual_path.as_str()), Some("ProjectRoot"));
    assert_eq!(tree.registry().lookup("MyLib"), Some(NodeId::ROOT));
}

#[test]
fn test_registry_first_in_preorder_wins() {
    let tree = game();
    let module = tree.find_module("ModuleA").expect("ModuleA registered");
    assert_eq!(module.virtual_path, "game/ReplicatedStorage/ModuleA");
    assert_eq!(tree.registry().duplicates(), &["ModuleA".to_string()]);
}

#[test]
fn test_registry_only_holds_module_scripts() {
    let tree = game();
    assert!(tree.registry().lookup("Main").is_none());
    assert!(tree.registry().lookup("Shared").is_none());
    assert!(tree.registry().lookup("Missing").is_none());
    assert_eq!(tree.registry().len(), 2);
}

#[test]
fn test_real_path_prefers_script_files() {
    let tree = game();
    let util = tree.find_module("Util").expect("Util registered");
    assert_eq!(util.real_path(), Some(Path::new("util.lua")));
    let folder = tree
        .find_by_virtual_path("game/ReplicatedStorage/Shared")
        .expect("folder");
    assert_eq!(folder.real_path(), None);
}

#[test]
fn test_find_by_file_path() {
    let tree = game();
    let node = tree
        .find_by_file_path(Path::new("shared/modulea.luau"))
        .expect("node for file");
    assert_eq!(node.virtual_path, "game/ReplicatedStorage/Shared/ModuleA");
}

#[test]
fn test_resolve_path_from_game() {
    let tree = game();
    let node = tree
        .resolve_path(None, &path(&["game", "ReplicatedStorage", "Shared", "Util"]))
        .expect("resolves");
    assert_eq!(node.name, "Util");
    assert!(tree.resolve_path(None, &path(&["game", "Nope"])).is_none());
    assert!(tree.resolve_path(None, &path(&["workspace", "X"])).is_none());
}

#[test]
fn test_resolve_path_from_script() {
    let tree = game();
    let util = tree.find_module("Util").expect("Util").id;
    let sibling = tree
        .resolve_path(Some(util), &path(&["script", "Parent", "ModuleA"]))
        .expect("sibling resolves");
    assert_eq!(sibling.virtual_path, "game/ReplicatedStorage/Shared/ModuleA");
    // `script` needs a caller.
    assert!(tree.resolve_path(None, &path(&["script", "Parent"])).is_none());
}

#[test]
fn test_game_requires_data_model_root() {
    let tree = SourceTree::from_json(
        r#"{ "name": "Lib", "className": "Folder", "children": [{ "name": "A", "className": "ModuleScript" }] }"#,
        1,
    )
    .expect("valid sourcemap");
    assert!(tree.resolve_path(None, &path(&["game", "A"])).is_none());
}

#[test]
fn test_children_keep_declaration_order() {
    let tree = game();
    let storage = tree
        .find_by_virtual_path("game/ReplicatedStorage")
        .expect("storage");
    let names: Vec<&str> = storage
        .children
        .iter()
        .filter_map(|id| tree.node(*id))
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["ModuleA", "Shared"]);
}

#[test]
fn test_invalid_json_is_an_error() {
    assert!(matches!(
        SourceTree::from_json("{ \"name\": 1 }", 1),
        Err(SourcemapError::Json(_))
    ));
}

#[test]
fn test_depth_limit() {
    let mut node = SourcemapNode::new("Leaf", "ModuleScript");
    for i in 0..(MAX_SOURCEMAP_DEPTH + 1) {
        node = SourcemapNode::new(format!("Level{i}"), "Folder").with_child(node);
    }
    assert!(matches!(
        SourceTree::build(node, 1),
        Err(SourcemapError::TooDeep { .. })
    ));
}

#[test]
fn test_detached_cache_is_separate() {
    let tree = game();
    let detached = tree.string_require_cache(None).expect("detached cache");
    let root = tree.string_require_cache(Some(NodeId::ROOT)).expect("root cache");
    detached.insert(modreq_solver::ContextId::fresh(), TypeId::ANY);
    assert_eq!(detached.len(), 1);
    assert!(root.is_empty());
    assert!(tree.require_cache().is_empty());
}
