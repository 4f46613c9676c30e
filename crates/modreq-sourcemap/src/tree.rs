//! The immutable node arena built from a sourcemap.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use modreq_common::limits::MAX_SOURCEMAP_DEPTH;
use modreq_solver::{ContextId, GlobalRegion, TypeId};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::description::SourcemapNode;
use crate::error::SourcemapError;
use crate::registry::ModuleNameRegistry;
use crate::{DATA_MODEL_CLASS, MODULE_SCRIPT_CLASS};

/// Per-node cache of published require types, keyed by checking context.
pub type TypeCache = DashMap<ContextId, TypeId<GlobalRegion>>;

/// Index of a node in the [`SourceTree`] that created it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub const fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
pub struct SourceNode {
    pub id: NodeId,
    pub name: String,
    pub class_name: String,
    /// Canonical address the backends resolve against, e.g.
    /// `game/ReplicatedStorage/Test`.
    pub virtual_path: String,
    pub file_paths: Vec<PathBuf>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// String-require function types published for this node.
    pub string_require_types: TypeCache,
}

impl SourceNode {
    pub fn is_module_script(&self) -> bool {
        self.class_name == MODULE_SCRIPT_CLASS
    }

    pub fn is_script(&self) -> bool {
        matches!(
            self.class_name.as_str(),
            "ModuleScript" | "Script" | "LocalScript"
        )
    }

    /// The script file backing this node: the first `.luau`/`.lua` entry,
    /// else the first entry.
    pub fn real_path(&self) -> Option<&Path> {
        self.file_paths
            .iter()
            .find(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("luau" | "lua")
                )
            })
            .or_else(|| self.file_paths.first())
            .map(PathBuf::as_path)
    }
}

/// One loaded sourcemap. Immutable once built, apart from the type caches.
#[derive(Debug)]
pub struct SourceTree {
    generation: u64,
    nodes: Vec<SourceNode>,
    registry: ModuleNameRegistry,
    by_virtual_path: FxHashMap<String, NodeId>,
    by_file_path: FxHashMap<PathBuf, NodeId>,
    /// Cache for scripts that are not part of the tree.
    detached_string_require_types: TypeCache,
    /// The structural `require` function bound to this tree, per context.
    require_types: TypeCache,
}

impl SourceTree {
    /// A tree with no nodes, used before any sourcemap is loaded.
    pub fn empty(generation: u64) -> SourceTree {
        SourceTree {
            generation,
            nodes: Vec::new(),
            registry: ModuleNameRegistry::default(),
            by_virtual_path: FxHashMap::default(),
            by_file_path: FxHashMap::default(),
            detached_string_require_types: TypeCache::new(),
            require_types: TypeCache::new(),
        }
    }

    pub fn from_json(json: &str, generation: u64) -> Result<SourceTree, SourcemapError> {
        let root: SourcemapNode = serde_json::from_str(json)?;
        SourceTree::build(root, generation)
    }

    /// Flattens a sourcemap description into a tree.
    ///
    /// Nodes are numbered in depth-first pre-order, which is also the order
    /// in which module names are registered.
    pub fn build(root: SourcemapNode, generation: u64) -> Result<SourceTree, SourcemapError> {
        let mut tree = SourceTree::empty(generation);
        let root_path = if root.class_name == DATA_MODEL_CLASS {
            "game".to_string()
        } else {
            "ProjectRoot".to_string()
        };

        // (description, parent, virtual path, depth)
        let mut stack = vec![(root, None::<NodeId>, root_path, 0u32)];
        while let Some((mut desc, parent, virtual_path, depth)) = stack.pop() {
            if depth > MAX_SOURCEMAP_DEPTH {
                return Err(SourcemapError::TooDeep {
                    path: virtual_path,
                    limit: MAX_SOURCEMAP_DEPTH,
                });
            }
            let id = NodeId(tree.nodes.len() as u32);
            let children = std::mem::take(&mut desc.children);
            for child in children.into_iter().rev() {
                let child_path = format!("{virtual_path}/{}", child.name);
                stack.push((child, Some(id), child_path, depth + 1));
            }

            if let Some(parent) = parent {
                tree.nodes[parent.0 as usize].children.push(id);
            }
            if desc.class_name == MODULE_SCRIPT_CLASS {
                tree.registry.register(&desc.name, id, &virtual_path);
            }
            tree.by_virtual_path.entry(virtual_path.clone()).or_insert(id);
            for path in &desc.file_paths {
                tree.by_file_path.entry(path.clone()).or_insert(id);
            }
            tree.nodes.push(SourceNode {
                id,
                name: desc.name,
                class_name: desc.class_name,
                virtual_path,
                file_paths: desc.file_paths,
                parent,
                children: Vec::new(),
                string_require_types: TypeCache::new(),
            });
        }

        debug!(
            generation,
            nodes = tree.nodes.len(),
            registered = tree.registry.len(),
            duplicates = tree.registry.duplicates().len(),
            "built source tree"
        );
        Ok(tree)
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&SourceNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> Option<&SourceNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SourceNode> {
        self.nodes.iter()
    }

    pub fn registry(&self) -> &ModuleNameRegistry {
        &self.registry
    }

    /// Registry lookup returning the node itself.
    pub fn find_module(&self, name: &str) -> Option<&SourceNode> {
        self.node(self.registry.lookup(name)?)
    }

    pub fn find_by_virtual_path(&self, virtual_path: &str) -> Option<&SourceNode> {
        self.node(*self.by_virtual_path.get(virtual_path)?)
    }

    /// The node backed by `path`, matching the path as written in the
    /// sourcemap (relative to the project root).
    pub fn find_by_file_path(&self, path: &Path) -> Option<&SourceNode> {
        self.node(*self.by_file_path.get(path)?)
    }

    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<&SourceNode> {
        self.node(parent)?
            .children
            .iter()
            .filter_map(|child| self.node(*child))
            .find(|child| child.name == name)
    }

    /// Resolves a structural path such as `game.ReplicatedStorage.Test` or
    /// `script.Parent.Sibling`.
    ///
    /// The first segment must be `game` (only when the root is a DataModel)
    /// or `script` (the caller). `Parent` walks up; any other segment selects
    /// the first child with that name.
    pub fn resolve_path(&self, caller: Option<NodeId>, segments: &[String]) -> Option<&SourceNode> {
        let (first, rest) = segments.split_first()?;
        let mut current = match first.as_str() {
            "game" => {
                let root = self.root()?;
                if root.class_name != DATA_MODEL_CLASS {
                    return None;
                }
                root
            }
            "script" => self.node(caller?)?,
            _ => return None,
        };
        for segment in rest {
            current = if segment == "Parent" {
                self.node(current.parent?)?
            } else {
                self.child_by_name(current.id, segment)?
            };
        }
        Some(current)
    }

    /// The string-require type cache for `node`, or the tree-level cache for
    /// scripts outside the tree.
    pub fn string_require_cache(&self, node: Option<NodeId>) -> Option<&TypeCache> {
        match node {
            Some(id) => self.node(id).map(|node| &node.string_require_types),
            None => Some(&self.detached_string_require_types),
        }
    }

    pub fn require_cache(&self) -> &TypeCache {
        &self.require_types
    }
}

#[cfg(test)]
#[path = "../tests/tree_tests.rs"]
mod tests;
