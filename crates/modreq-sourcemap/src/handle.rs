//! Ownership of the current source tree across reloads.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, info};

use crate::description::SourcemapNode;
use crate::error::SourcemapError;
use crate::tree::{NodeId, SourceTree};

/// Holds the current [`SourceTree`].
///
/// A reload builds a complete new tree (nodes, registry, caches) and swaps
/// it in under the write lock, so readers see either the old tree or the
/// new one. Readers that took an `Arc` before the swap keep the old tree
/// alive until they are done with it.
#[derive(Debug)]
pub struct SourcemapHandle {
    current: RwLock<Arc<SourceTree>>,
    next_generation: AtomicU64,
    /// Serializes reloads so generations become current in order.
    reload: Mutex<()>,
}

impl Default for SourcemapHandle {
    fn default() -> Self {
        SourcemapHandle::new()
    }
}

impl SourcemapHandle {
    /// A handle holding an empty tree (generation 0).
    pub fn new() -> SourcemapHandle {
        SourcemapHandle {
            current: RwLock::new(Arc::new(SourceTree::empty(0))),
            next_generation: AtomicU64::new(1),
            reload: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<SourceTree> {
        Arc::clone(&self.current.read().expect("sourcemap lock poisoned"))
    }

    pub fn generation(&self) -> u64 {
        self.current.read().expect("sourcemap lock poisoned").generation()
    }

    /// Builds a tree from `root` and makes it current.
    pub fn replace(&self, root: SourcemapNode) -> Result<Arc<SourceTree>, SourcemapError> {
        let _reload = self.reload.lock().expect("reload lock poisoned");
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let tree = Arc::new(SourceTree::build(root, generation)?);
        let previous = {
            let mut current = self.current.write().expect("sourcemap lock poisoned");
            std::mem::replace(&mut *current, Arc::clone(&tree))
        };
        info!(
            generation,
            previous_generation = previous.generation(),
            nodes = tree.len(),
            registered = tree.registry().len(),
            "sourcemap loaded"
        );
        Ok(tree)
    }

    pub fn load_json(&self, json: &str) -> Result<Arc<SourceTree>, SourcemapError> {
        let root: SourcemapNode = serde_json::from_str(json)?;
        self.replace(root)
    }

    pub fn load_file(&self, path: &Path) -> Result<Arc<SourceTree>, SourcemapError> {
        debug!(path = %path.display(), "reading sourcemap");
        let json = std::fs::read_to_string(path).map_err(|source| SourcemapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_json(&json)
    }

    /// Drops the current tree in favour of an empty one.
    pub fn clear(&self) {
        let _reload = self.reload.lock().expect("reload lock poisoned");
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write().expect("sourcemap lock poisoned") =
            Arc::new(SourceTree::empty(generation));
        info!(generation, "sourcemap cleared");
    }
}

/// A reference to a node (or to the detached slot when `node` is `None`)
/// that does not keep its tree alive.
#[derive(Clone, Debug)]
pub struct WeakNodeRef {
    tree: Weak<SourceTree>,
    node: Option<NodeId>,
    generation: u64,
}

impl WeakNodeRef {
    pub fn new(tree: &Arc<SourceTree>, node: Option<NodeId>) -> WeakNodeRef {
        WeakNodeRef {
            tree: Arc::downgrade(tree),
            node,
            generation: tree.generation(),
        }
    }

    pub const fn node_id(&self) -> Option<NodeId> {
        self.node
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The tree, if it is still alive and still the current tree of `handle`.
    pub fn upgrade_current(&self, handle: &SourcemapHandle) -> Option<Arc<SourceTree>> {
        let tree = self.tree.upgrade()?;
        (handle.generation() == self.generation).then_some(tree)
    }
}

#[cfg(test)]
#[path = "../tests/handle_tests.rs"]
mod tests;
