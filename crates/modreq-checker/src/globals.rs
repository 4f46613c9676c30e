//! Checking contexts.

use std::sync::Arc;

use modreq_solver::{ContextId, GlobalRegion, TypeArena, TypeId};
use modreq_sourcemap::SourceTree;
use serde::Serialize;
use tracing::debug;

use crate::publisher;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// The context diagnostics are computed in.
    Full,
    /// A separate universe used while completing; never shares types with
    /// the full context.
    Autocomplete,
}

/// One global type universe: its identity and arena.
#[derive(Debug)]
pub struct GlobalTypes {
    id: ContextId,
    kind: ContextKind,
    arena: TypeArena<GlobalRegion>,
}

impl GlobalTypes {
    pub fn new(kind: ContextKind) -> GlobalTypes {
        let id = ContextId::fresh();
        debug!(context = %id, ?kind, "created global types");
        GlobalTypes {
            id,
            kind,
            arena: TypeArena::new(),
        }
    }

    pub const fn id(&self) -> ContextId {
        self.id
    }

    pub const fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn arena(&self) -> &TypeArena<GlobalRegion> {
        &self.arena
    }

    /// The structural `require` function of this context for `tree`.
    pub fn require_type(&self, tree: &Arc<SourceTree>) -> TypeId<GlobalRegion> {
        publisher::require_type(self, tree)
    }
}
