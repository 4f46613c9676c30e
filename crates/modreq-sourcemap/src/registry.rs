use rustc_hash::FxHashMap;
use tracing::warn;

use crate::tree::NodeId;

/// Flat map from module name to the node that name requires.
///
/// Entries are plain ids into the tree that built the registry; the
/// registry is rebuilt together with its tree and never outlives it.
#[derive(Clone, Debug, Default)]
pub struct ModuleNameRegistry {
    entries: FxHashMap<String, NodeId>,
    duplicates: Vec<String>,
}

impl ModuleNameRegistry {
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Names registered more than once, in the order the conflicts were found.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Registers `name` unless it is already taken; the first registration
    /// wins.
    pub(crate) fn register(&mut self, name: &str, node: NodeId, virtual_path: &str) {
        if let Some(existing) = self.entries.get(name) {
            warn!(
                name,
                kept = existing.index(),
                ignored = %virtual_path,
                "duplicate module name in sourcemap"
            );
            if !self.duplicates.iter().any(|d| d == name) {
                self.duplicates.push(name.to_string());
            }
            return;
        }
        self.entries.insert(name.to_string(), node);
    }
}
