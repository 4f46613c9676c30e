//! Name resolution shared by both backends.

use std::sync::Arc;

use modreq_sourcemap::{NodeId, SourceTree};
use rustc_hash::FxHashMap;

use crate::globals::GlobalTypes;
use crate::module::TypeRef;
use crate::platform::Platform;

/// Lexical scopes over the platform's globals.
pub(crate) struct Environment<'a> {
    pub(crate) platform: &'a Platform,
    pub(crate) globals: &'a GlobalTypes,
    /// The one tree this check resolves against.
    tree: Arc<SourceTree>,
    caller: Option<NodeId>,
    frames: Vec<FxHashMap<String, TypeRef>>,
}

impl<'a> Environment<'a> {
    pub(crate) fn new(
        platform: &'a Platform,
        globals: &'a GlobalTypes,
        tree: Arc<SourceTree>,
        caller: Option<NodeId>,
    ) -> Self {
        Environment {
            platform,
            globals,
            tree,
            caller,
            frames: vec![FxHashMap::default()],
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub(crate) fn declare(&mut self, name: &str, ty: TypeRef) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    /// Rebinds an existing local. Returns false for globals.
    pub(crate) fn assign(&mut self, name: &str, ty: TypeRef) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = ty;
                return true;
            }
        }
        false
    }

    /// Locals first, then platform globals; unknown names are `any`.
    pub(crate) fn lookup(&self, name: &str) -> TypeRef {
        for frame in self.frames.iter().rev() {
            if let Some(ty) = frame.get(name) {
                return *ty;
            }
        }
        self.platform
            .lookup_global(self.globals, &self.tree, self.caller, name)
            .map_or(TypeRef::ANY, TypeRef::Global)
    }
}
