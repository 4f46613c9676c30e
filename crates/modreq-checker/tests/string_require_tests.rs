use super::*;
use modreq_common::Span;
use modreq_solver::{ArgShape, CallArg};
use modreq_sourcemap::SourcemapHandle;

const SOURCEMAP: &str = r#"{
    "name": "Game",
    "className": "DataModel",
    "children": [
        {
            "name": "ServerStorage",
            "className": "ServerStorage",
            "children": [
                { "name": "TestModule", "className": "ModuleScript", "filePaths": ["testmodule.luau"] },
                { "name": "Caller", "className": "ModuleScript", "filePaths": ["caller.luau"] }
            ]
        }
    ]
}"#;

fn tree() -> Arc<SourceTree> {
    Arc::new(SourceTree::from_json(SOURCEMAP, 1).expect("valid sourcemap"))
}

fn call(shapes: Vec<ArgShape>) -> CallSite {
    let mut offset = 10;
    let args = shapes.into_iter().map(|shape| {
        let arg = CallArg {
            location: Span::new(offset, offset + 4),
            shape,
        };
        offset += 6;
        arg
    });
    CallSite::new(Span::new(0, 40), args.collect::<Vec<_>>())
}

fn named(name: &str) -> CallSite {
    call(vec![ArgShape::String(name.to_string())])
}

fn nilable(name: &str, flag: ArgShape) -> CallSite {
    call(vec![ArgShape::String(name.to_string()), flag])
}

#[test]
fn test_registered_name_resolves_to_virtual_path() {
    let tree = tree();
    let magic = MagicStringRequire::new(&tree, Some("Caller".to_string()));
    assert_eq!(
        magic.resolve(&named("TestModule")),
        Ok(Resolution::Module {
            virtual_path: "game/ServerStorage/TestModule".to_string(),
            nilable: false,
        })
    );
}

#[test]
fn test_self_reference_is_rejected_regardless_of_flag() {
    let tree = tree();
    let magic = MagicStringRequire::new(&tree, Some("TestModule".to_string()));
    let expected = Err(ResolveError::SelfReference("TestModule".to_string()));
    assert_eq!(magic.resolve(&named("TestModule")), expected);
    assert_eq!(
        magic.resolve(&nilable("TestModule", ArgShape::Bool(true))),
        expected
    );
}

#[test]
fn test_unknown_name_strict_and_nilable() {
    let tree = tree();
    let magic = MagicStringRequire::new(&tree, None);
    assert_eq!(
        magic.resolve(&named("Missing")),
        Err(ResolveError::UnknownModule(Some("Missing".to_string())))
    );
    assert_eq!(
        magic.resolve(&nilable("Missing", ArgShape::Bool(true))),
        Ok(Resolution::Nil)
    );
}

#[test]
fn test_only_literal_true_is_nilable() {
    assert!(is_nilable_call(&nilable("X", ArgShape::Bool(true))));
    assert!(!is_nilable_call(&nilable("X", ArgShape::Bool(false))));
    assert!(!is_nilable_call(&nilable("X", ArgShape::Other)));
    assert!(!is_nilable_call(&nilable("X", ArgShape::String("true".into()))));
    assert!(!is_nilable_call(&named("X")));

    let tree = tree();
    let magic = MagicStringRequire::new(&tree, None);
    assert_eq!(
        magic.resolve(&nilable("Missing", ArgShape::Other)),
        Err(ResolveError::UnknownModule(Some("Missing".to_string())))
    );
}

#[test]
fn test_missing_or_non_literal_name() {
    let tree = tree();
    let magic = MagicStringRequire::new(&tree, None);
    let expected = Err(ResolveError::UnknownModule(None));
    assert_eq!(magic.resolve(&call(Vec::new())), expected);
    assert_eq!(magic.resolve(&call(vec![ArgShape::Other])), expected);
    assert_eq!(
        magic.resolve(&call(vec![ArgShape::Path(vec!["name".into()])])),
        expected
    );
}

#[test]
fn test_resolution_stays_on_the_published_tree() {
    let handle = SourcemapHandle::new();
    let published = handle.load_json(SOURCEMAP).expect("valid sourcemap");
    let magic = MagicStringRequire::new(&published, None);
    assert_eq!(magic.generation(), published.generation());

    handle
        .load_json(r#"{ "name": "Game", "className": "DataModel" }"#)
        .expect("valid sourcemap");
    assert!(handle.current().find_module("TestModule").is_none());
    assert_eq!(
        magic.resolve(&named("TestModule")),
        Ok(Resolution::Module {
            virtual_path: "game/ServerStorage/TestModule".to_string(),
            nilable: false,
        })
    );
}

#[test]
fn test_dropped_tree_resolves_nothing() {
    let magic = MagicStringRequire::new(&tree(), Some("Caller".to_string()));
    assert_eq!(
        magic.resolve(&named("TestModule")),
        Err(ResolveError::UnknownModule(Some("TestModule".to_string())))
    );
    assert_eq!(
        magic.resolve(&nilable("TestModule", ArgShape::Bool(true))),
        Ok(Resolution::Nil)
    );
    assert_eq!(
        magic.resolve(&named("Caller")),
        Err(ResolveError::SelfReference("Caller".to_string()))
    );
    assert_eq!(magic.resolve_target(&named("TestModule"), "main.luau"), None);
}

#[test]
fn test_resolve_error_kinds() {
    assert_eq!(
        ResolveError::SelfReference("A".into()).to_kind(),
        TypeErrorKind::UnknownRequire {
            module_name: Some("A".into())
        }
    );
    assert_eq!(
        ResolveError::UnknownModule(None).to_kind(),
        TypeErrorKind::UnknownRequire { module_name: None }
    );
}

#[test]
fn test_resolve_target_only_for_modules() {
    let tree = tree();
    let magic = MagicStringRequire::new(&tree, None);
    assert_eq!(
        magic.resolve_target(&named("TestModule"), "main.luau").as_deref(),
        Some("game/ServerStorage/TestModule")
    );
    assert_eq!(
        magic.resolve_target(&nilable("Missing", ArgShape::Bool(true)), "main.luau"),
        None
    );
    assert_eq!(magic.resolve_target(&named("Missing"), "main.luau"), None);
}
